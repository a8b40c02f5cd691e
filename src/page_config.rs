//! # Page Configuration Module
//!
//! ## Purpose
//! Keeps the identifiers of the host-page anchors the form works with, and where the
//! rendered page is written, in one JSON file instead of hardcoding them in every operation.
//!
//! ## Architecture
//! - **PageConfig**: serializable configuration structure
//! - **PageConfigManager**: loads, updates and saves the configuration file
//! - **Configuration File**: `page_config.json` in the working directory by default
//!
//! ## Configuration Format
//! ```json
//! {
//!   "reactants_container": "Reactants",
//!   "results_container": "divelement",
//!   "scroll_anchor": "General_information",
//!   "output_file": "reaction_form.html",
//!   "title": "Reaction data"
//! }
//! ```
//! Missing keys fall back to the defaults above.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "page_config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed configuration file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Identifiers of the page anchors and output settings.
///
/// # Fields
/// * `reactants_container` - id of the element reactant rows are appended to
/// * `results_container` - id of the element the summary is rendered into
/// * `scroll_anchor` - id of the "General information" section, target of the scroll after clearing
/// * `output_file` - where the page HTML is exported
/// * `title` - document title of the standard page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub reactants_container: String,
    pub results_container: String,
    pub scroll_anchor: String,
    pub output_file: String,
    pub title: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            reactants_container: "Reactants".to_string(),
            results_container: "divelement".to_string(),
            scroll_anchor: "General_information".to_string(),
            output_file: "reaction_form.html".to_string(),
            title: "Reaction data".to_string(),
        }
    }
}

/// Owns the current configuration together with the file it persists to.
#[derive(Debug, Clone)]
pub struct PageConfigManager {
    config: PageConfig,
    config_file: String,
}

impl PageConfigManager {
    /// Loads `page_config.json` from the working directory, or defaults when it is
    /// missing or unreadable.
    pub fn new() -> Self {
        Self::with_config_file(DEFAULT_CONFIG_FILE)
    }

    pub fn with_config_file(config_file: &str) -> Self {
        let config = match Self::load_config(config_file) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}; using default page configuration", e);
                PageConfig::default()
            }
        };
        Self {
            config,
            config_file: config_file.to_string(),
        }
    }

    /// Reads the configuration file. A file that does not exist yields the defaults;
    /// an unreadable or malformed one is an error.
    pub fn load_config(config_file: &str) -> Result<PageConfig, ConfigError> {
        if Path::new(config_file).exists() {
            let content = fs::read_to_string(config_file)?;
            let config: PageConfig = serde_json::from_str(&content)?;
            info!("page configuration loaded from {}", config_file);
            Ok(config)
        } else {
            Ok(PageConfig::default())
        }
    }

    pub fn save_config(&self) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self.config)?;
        fs::write(&self.config_file, content)?;
        info!("page configuration saved to {}", self.config_file);
        Ok(())
    }

    pub fn get_config(&self) -> &PageConfig {
        &self.config
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Updates the export path and saves the configuration.
    pub fn set_output_file(&mut self, path: &str) -> Result<(), ConfigError> {
        self.config.output_file = path.to_string();
        self.save_config()
    }

    /// Restores the default configuration and saves it.
    pub fn reset_to_defaults(&mut self) -> Result<(), ConfigError> {
        self.config = PageConfig::default();
        self.save_config()
    }
}

impl Default for PageConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let manager = PageConfigManager::with_config_file(path.to_str().unwrap());
        assert_eq!(manager.get_config(), &PageConfig::default());
        assert_eq!(manager.get_config().results_container, "divelement");
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "results_container": "summary" }}"#).unwrap();
        let config = PageConfigManager::load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.results_container, "summary");
        assert_eq!(config.reactants_container, "Reactants");
        assert_eq!(config.scroll_anchor, "General_information");
    }

    #[test]
    fn test_malformed_file_is_an_error_but_manager_falls_back() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        let path = file.path().to_str().unwrap();
        assert!(matches!(
            PageConfigManager::load_config(path),
            Err(ConfigError::Json(_))
        ));
        let manager = PageConfigManager::with_config_file(path);
        assert_eq!(manager.get_config(), &PageConfig::default());
    }

    #[test]
    fn test_set_output_file_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page_config.json");
        let path = path.to_str().unwrap();

        let mut manager = PageConfigManager::with_config_file(path);
        manager.set_output_file("summary.html").unwrap();

        let reloaded = PageConfigManager::with_config_file(path);
        assert_eq!(reloaded.get_config().output_file, "summary.html");

        let mut manager = reloaded;
        manager.reset_to_defaults().unwrap();
        let config = PageConfigManager::load_config(path).unwrap();
        assert_eq!(config.output_file, "reaction_form.html");
    }
}
