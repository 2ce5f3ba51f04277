use std::path::PathBuf;

use resprefix::{Config, check};

use crate::validation::validate_directory;

#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub against: Option<PathBuf>,
    pub json: bool,
}

pub fn run_check_command(config: Config, opts: CheckOptions) -> Result<(), String> {
    validate_directory(&config.root, "Root directory")?;
    if let Some(against) = &opts.against {
        validate_directory(against, "Resource directory")?;
    }

    let report =
        check(&config, opts.against.as_deref()).map_err(|e| format!("Check failed: {}", e))?;

    if opts.json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize check JSON: {}", e))?;
        println!("{}", text);
    } else {
        println!("{}", report);
    }

    if report.success() {
        Ok(())
    } else {
        Err(format!(
            "{} unprefixed file(s), {} conflict(s)",
            report.violations.len(),
            report.conflicts.len()
        ))
    }
}
