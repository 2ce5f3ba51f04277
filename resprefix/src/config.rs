//! Run configuration, loaded from `resprefix.toml`.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! layout of a typical multi-flavor Android module prefixed with `vod_`.

use std::{
    fmt::{Display, Formatter},
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    types::ResourceType,
};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "resprefix.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root directory of the Android module (the directory holding `src/`).
    pub root: PathBuf,
    pub prefix: String,
    /// Source sets, processed in this order.
    pub modules: Vec<ModuleConfig>,
    /// Directory name prefixes under `res/` whose files are renamed.
    pub resource_dirs: Vec<String>,
    /// File names that are never renamed.
    pub exempt_files: Vec<String>,
    /// Directories whose name contains this are never descended into for
    /// renaming. Their declarations are still prefixed.
    pub shared_dir_marker: String,
    pub declaration_tags: Vec<String>,
    /// Code directories inside a module.
    pub source_dirs: Vec<String>,
    pub source_extensions: Vec<String>,
    pub assets: AssetsConfig,
    /// Copy the root aside before an applying run.
    pub backup: bool,
    pub report_dir: PathBuf,
    /// Shell command run after an applying run, e.g. `./gradlew :vod:assembleDebug`.
    pub verify_command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModuleConfig {
    pub name: String,
    /// Path relative to [`Config::root`].
    pub path: PathBuf,
}

impl ModuleConfig {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ModuleConfig {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    pub enabled: bool,
    /// Subdirectory of `assets/` whose files are all renamed.
    pub images_dir: String,
    /// Individual files directly in `assets/` that are renamed.
    pub root_files: Vec<String>,
    /// Extensions of asset files whose content references other assets.
    pub text_extensions: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        AssetsConfig {
            enabled: true,
            images_dir: "images".to_string(),
            root_files: vec!["favicon.ico".to_string()],
            text_extensions: strings(&["html", "htm", "css", "js"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            root: PathBuf::from("vod"),
            prefix: "vod_".to_string(),
            modules: vec![
                ModuleConfig::new("main", "src/main"),
                ModuleConfig::new("leanback", "src/leanback"),
                ModuleConfig::new("mobile", "src/mobile"),
                ModuleConfig::new("catvod", "catvod/src/main"),
            ],
            resource_dirs: strings(&["layout", "drawable", "mipmap", "anim", "color", "menu", "xml"]),
            exempt_files: strings(&[
                "AndroidManifest.xml",
                "file_paths.xml",
                "ic_launcher.xml",
                "ic_launcher_round.xml",
            ]),
            shared_dir_marker: "values".to_string(),
            declaration_tags: strings(&[
                "string",
                "color",
                "style",
                "attr",
                "dimen",
                "integer",
                "bool",
                "string-array",
                "integer-array",
                "declare-styleable",
            ]),
            source_dirs: strings(&["java", "kotlin"]),
            source_extensions: strings(&["java", "kt"]),
            assets: AssetsConfig::default(),
            backup: false,
            report_dir: PathBuf::from("."),
            verify_command: None,
        }
    }
}

impl Config {
    /// Parses a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` if given, else `resprefix.toml` in the working directory
    /// if it exists, else the defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_prefix(&self.prefix)?;
        if self.modules.is_empty() {
            return Err(Error::invalid_config("at least one module is required"));
        }
        for (i, module) in self.modules.iter().enumerate() {
            if module.name.is_empty() {
                return Err(Error::invalid_config("module name must not be empty"));
            }
            if self.modules[..i].iter().any(|m| m.name == module.name) {
                return Err(Error::invalid_config(format!(
                    "duplicate module `{}`",
                    module.name
                )));
            }
        }
        if self.shared_dir_marker.is_empty() {
            return Err(Error::invalid_config("shared_dir_marker must not be empty"));
        }
        self.resource_types()?;
        self.declaration_types()?;
        Ok(())
    }

    /// The file-based resource types that are renamed.
    pub fn resource_types(&self) -> Result<Vec<ResourceType>> {
        self.resource_dirs
            .iter()
            .map(|dir| match ResourceType::from_dir_name(dir) {
                Some((res_type, None)) => Ok(res_type),
                _ => Err(Error::invalid_config(format!(
                    "`{}` is not a file-based resource directory",
                    dir
                ))),
            })
            .collect()
    }

    /// Declaration tags paired with the namespace each one declares into.
    pub fn declaration_types(&self) -> Result<Vec<(String, ResourceType)>> {
        self.declaration_tags
            .iter()
            .map(|tag| {
                ResourceType::from_declaration_tag(tag)
                    .map(|t| (tag.clone(), t))
                    .ok_or_else(|| {
                        Error::invalid_config(format!("`{}` is not a declaration tag", tag))
                    })
            })
            .collect()
    }

    pub fn module(&self, name: &str) -> Option<&ModuleConfig> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn module_path(&self, module: &ModuleConfig) -> PathBuf {
        self.root.join(&module.path)
    }

    /// Modules selected by `target`, in configuration order.
    pub fn resolve_target(&self, target: &Target) -> Result<Vec<&ModuleConfig>> {
        match target {
            Target::All => Ok(self.modules.iter().collect()),
            Target::Module(name) => self
                .module(name)
                .map(|m| vec![m])
                .ok_or_else(|| Error::UnknownTarget(name.clone())),
        }
    }

    pub fn is_exempt(&self, file_name: &str) -> bool {
        self.exempt_files.iter().any(|f| f == file_name)
    }

    pub fn is_shared_dir(&self, dir_name: &str) -> bool {
        dir_name.contains(&self.shared_dir_marker)
    }
}

fn validate_prefix(prefix: &str) -> Result<()> {
    let Some(first) = prefix.chars().next() else {
        return Err(Error::invalid_config("prefix must not be empty"));
    };
    if !first.is_ascii_alphabetic() {
        return Err(Error::invalid_config(format!(
            "prefix `{}` must start with a letter",
            prefix
        )));
    }
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::invalid_config(format!(
            "prefix `{}` may only contain letters, digits and `_`",
            prefix
        )));
    }
    Ok(())
}

/// Which modules a run processes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    All,
    Module(String),
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::All => write!(f, "all"),
            Target::Module(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" => Err(Error::UnknownTarget(s.to_string())),
            "all" => Ok(Target::All),
            name => Ok(Target::Module(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_empty_document_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_document_overrides() {
        let config = Config::from_toml_str(indoc! {r#"
            root = "live"
            prefix = "live_"

            [[modules]]
            name = "main"
            path = "src/main"

            [assets]
            enabled = false
        "#})
        .unwrap();
        assert_eq!(config.root, PathBuf::from("live"));
        assert_eq!(config.prefix, "live_");
        assert_eq!(config.modules.len(), 1);
        assert!(!config.assets.enabled);
        assert_eq!(config.assets.images_dir, "images");
        assert_eq!(config.exempt_files, Config::default().exempt_files);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = Config::from_toml_str("prefx = \"vod_\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_prefix_validation() {
        let mut config = Config::default();
        config.prefix = String::new();
        assert!(config.validate().is_err());
        config.prefix = "1vod_".to_string();
        assert!(config.validate().is_err());
        config.prefix = "vod-".to_string();
        assert!(config.validate().is_err());
        config.prefix = "vod_".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_module_is_rejected() {
        let mut config = Config::default();
        config.modules.push(ModuleConfig::new("main", "other"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate module `main`"));
    }

    #[test]
    fn test_invalid_resource_dir_is_rejected() {
        let mut config = Config::default();
        config.resource_dirs.push("values".to_string());
        assert!(config.validate().is_err());
        config.resource_dirs = vec!["drawable-hdpi".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_declaration_types() {
        let config = Config::default();
        let types = config.declaration_types().unwrap();
        assert!(types.contains(&("string-array".to_string(), ResourceType::Array)));
        assert!(types.contains(&("declare-styleable".to_string(), ResourceType::Styleable)));
    }

    #[test]
    fn test_resolve_target() {
        let config = Config::default();
        assert_eq!(config.resolve_target(&Target::All).unwrap().len(), 4);
        let mobile = config
            .resolve_target(&"mobile".parse().unwrap())
            .unwrap();
        assert_eq!(mobile[0].path, PathBuf::from("src/mobile"));
        assert!(matches!(
            config.resolve_target(&Target::Module("tv".to_string())),
            Err(Error::UnknownTarget(_))
        ));
    }

    #[test]
    fn test_module_path_joins_root() {
        let config = Config::default();
        let catvod = config.module("catvod").unwrap();
        assert_eq!(
            config.module_path(catvod),
            PathBuf::from("vod/catvod/src/main")
        );
    }

    #[test]
    fn test_shared_dir_and_exemptions() {
        let config = Config::default();
        assert!(config.is_shared_dir("values"));
        assert!(config.is_shared_dir("values-zh-rCN"));
        assert!(!config.is_shared_dir("drawable"));
        assert!(config.is_exempt("file_paths.xml"));
        assert!(!config.is_exempt("icon.xml"));
    }
}
