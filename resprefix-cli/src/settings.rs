use std::path::PathBuf;

use resprefix::Config;
use tracing::debug;

use crate::validation::validate_config_path;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub prefix: Option<String>,
}

/// Loads the config (explicit file, `resprefix.toml` or defaults) and
/// applies the command line overrides on top.
pub fn load_config(opts: &GlobalOptions) -> Result<Config, String> {
    if let Some(path) = &opts.config {
        validate_config_path(path)?;
    }
    let mut config = Config::discover(opts.config.as_deref())
        .map_err(|e| format!("Failed to load config: {}", e))?;

    if let Some(root) = &opts.root {
        config.root = root.clone();
    }
    if let Some(prefix) = &opts.prefix {
        config.prefix = prefix.clone();
    }
    config.validate().map_err(|e| e.to_string())?;
    debug!("Using config: {:?}", config);
    Ok(config)
}
