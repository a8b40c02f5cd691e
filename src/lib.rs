pub mod cli;
pub mod dom;
pub mod form;
pub mod page_config;
