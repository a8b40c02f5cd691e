//! # Form Module
//!
//! Reaction data entry: the reactant row factory, the summary table renderer,
//! the parameter grabber that reads the form back, and the host page wrapper
//! that ties them to the configured anchors.

pub mod grabber;
pub mod page;
pub mod reaction_input;
pub mod row_factory;
pub mod table_renderer;


use thiserror::Error;

/// error types of the form operations
#[derive(Debug, Error)]
pub enum FormError {
    #[error("element with id '{id}' not found in the page")]
    MissingAnchor { id: String },
    #[error(
        "reactant columns are misaligned: {names} names, {concentrations} concentrations, {units} units, {kinds} kinds"
    )]
    MisalignedInput {
        names: usize,
        concentrations: usize,
        units: usize,
        kinds: usize,
    },
    #[error("unknown concentration unit '{0}'")]
    UnknownUnit(String),
    #[error("unknown reactant kind '{0}'")]
    UnknownKind(String),
    #[error("reactant row {index} does not exist ({len} rows)")]
    RowOutOfRange { index: usize, len: usize },
    #[error("concentration value '{0}' is not a number")]
    InvalidConcentration(String),
    #[error("invalid reaction input JSON: {0}")]
    Json(#[from] serde_json::Error),
}
