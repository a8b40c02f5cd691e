use log::{LevelFilter, error, info};
use reaction_form::cli::cli_main::run_interactive_menu;
use reaction_form::form::page::Page;
use reaction_form::page_config::PageConfigManager;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::fs;

/// `reaction_form [--verbose] [template.html]`
pub fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let level = if args.iter().any(|a| a == "--verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("logger not initialised: {}", e);
    }

    let manager = PageConfigManager::new();
    let config = manager.get_config().clone();
    let page = match args.iter().find(|a| !a.starts_with("--")) {
        Some(template) => match fs::read_to_string(template) {
            Ok(html) => {
                info!("using page template {}", template);
                Page::from_html(&html, config)
            }
            Err(e) => {
                error!("cannot read template {}: {}", template, e);
                return;
            }
        },
        None => Page::standard(config),
    };
    run_interactive_menu(page, manager);
}
