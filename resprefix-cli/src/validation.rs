use std::path::Path;

use resprefix::{Config, Target};

/// Validate config file path exists and is a file
pub fn validate_config_path(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("Config file does not exist: {}", path.display()));
    }
    if !path.is_file() {
        return Err(format!("Config path is not a file: {}", path.display()));
    }
    Ok(())
}

/// Validate a directory argument (`--root`, `--against`)
pub fn validate_directory(path: &Path, what: &str) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("{} does not exist: {}", what, path.display()));
    }
    if !path.is_dir() {
        return Err(format!("{} is not a directory: {}", what, path.display()));
    }
    Ok(())
}

/// Validate the report directory exists or can be created
pub fn validate_report_dir(path: &Path) -> Result<(), String> {
    if path.is_file() {
        return Err(format!("Report directory is a file: {}", path.display()));
    }
    if !path.exists() {
        std::fs::create_dir_all(path)
            .map_err(|e| format!("Cannot create report directory: {}", e))?;
    }
    Ok(())
}

/// Validate `--target` against the configured modules
pub fn validate_target(target: &str, config: &Config) -> Result<Target, String> {
    let target: Target = target.parse().map_err(|e| format!("{}", e))?;
    if let Target::Module(name) = &target {
        if config.module(name).is_none() {
            let known: Vec<&str> = config.modules.iter().map(|m| m.name.as_str()).collect();
            return Err(format!(
                "Unknown target '{}'. Configured modules: {}",
                name,
                known.join(", ")
            ));
        }
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_directory(temp_dir.path(), "Root").is_ok());

        let missing = temp_dir.path().join("missing");
        let err = validate_directory(&missing, "Root").unwrap_err();
        assert!(err.contains("Root does not exist"));

        let file = temp_dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        let err = validate_directory(&file, "Root").unwrap_err();
        assert!(err.contains("is not a directory"));
    }

    #[test]
    fn test_validate_target() {
        let config = Config::default();
        assert_eq!(validate_target("all", &config).unwrap(), Target::All);
        assert_eq!(
            validate_target("mobile", &config).unwrap(),
            Target::Module("mobile".to_string())
        );
        let err = validate_target("tablet", &config).unwrap_err();
        assert!(err.contains("Unknown target 'tablet'"));
        assert!(err.contains("main, leanback, mobile, catvod"));
    }
}
