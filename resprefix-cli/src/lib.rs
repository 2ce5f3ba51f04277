//! CLI library for testing purposes

pub mod settings;
pub mod validation;

pub use settings::{GlobalOptions, load_config};
