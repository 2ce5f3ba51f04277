//! Declares `resourcePrefix` in the module's Gradle build so that new
//! resources are linted for the prefix too.

use std::{
    fmt::{Display, Formatter},
    fs,
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};

lazy_static! {
    static ref ANDROID_BLOCK_REGEX: Regex = Regex::new(r"(?m)^([ \t]*)android\s*\{").unwrap();
    static ref RESOURCE_PREFIX_REGEX: Regex = Regex::new(r"\bresourcePrefix\b").unwrap();
}

/// Build scripts looked up in the module root, Kotlin DSL first.
pub const BUILD_FILES: [&str; 2] = ["build.gradle.kts", "build.gradle"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "path", rename_all = "snake_case")]
pub enum GradleUpdate {
    /// `resourcePrefix` was (or would be) added.
    Updated(PathBuf),
    AlreadySet(PathBuf),
    /// The build file has no `android { }` block to add it to.
    NoAndroidBlock(PathBuf),
    NoBuildFile,
}

impl GradleUpdate {
    pub fn is_ok(&self) -> bool {
        matches!(self, GradleUpdate::Updated(_) | GradleUpdate::AlreadySet(_))
    }
}

impl Display for GradleUpdate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GradleUpdate::Updated(p) => write!(f, "added resourcePrefix to {}", p.display()),
            GradleUpdate::AlreadySet(p) => write!(f, "resourcePrefix already set in {}", p.display()),
            GradleUpdate::NoAndroidBlock(p) => write!(
                f,
                "no android {{ }} block in {}; add resourcePrefix manually",
                p.display()
            ),
            GradleUpdate::NoBuildFile => write!(f, "no build.gradle(.kts) found"),
        }
    }
}

pub fn build_file(root: &Path) -> Option<PathBuf> {
    BUILD_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

pub fn has_resource_prefix(content: &str) -> bool {
    RESOURCE_PREFIX_REGEX.is_match(content)
}

/// Inserts `resourcePrefix = "<prefix>"` as the first line of the first
/// `android {` block. Returns `None` when there is no such block.
pub fn insert_resource_prefix(content: &str, prefix: &str) -> Option<String> {
    let caps = ANDROID_BLOCK_REGEX.captures(content)?;
    let block = caps.get(0)?;
    let indent = caps.get(1).map_or("", |m| m.as_str());
    let line = format!("\n{}    resourcePrefix = \"{}\"", indent, prefix);

    let mut out = String::with_capacity(content.len() + line.len());
    out.push_str(&content[..block.end()]);
    out.push_str(&line);
    out.push_str(&content[block.end()..]);
    Some(out)
}

/// Adds `resourcePrefix` to the build file under `root`, unless present.
pub fn configure(root: &Path, prefix: &str, dry_run: bool) -> Result<GradleUpdate> {
    let Some(path) = build_file(root) else {
        return Ok(GradleUpdate::NoBuildFile);
    };
    let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    if has_resource_prefix(&content) {
        return Ok(GradleUpdate::AlreadySet(path));
    }
    let Some(updated) = insert_resource_prefix(&content, prefix) else {
        return Ok(GradleUpdate::NoAndroidBlock(path));
    };
    if dry_run {
        info!("Would add resourcePrefix to: {:?}", path);
    } else {
        info!("Adding resourcePrefix to: {:?}", path);
        fs::write(&path, updated).map_err(|e| Error::io(&path, e))?;
    }
    Ok(GradleUpdate::Updated(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tempfile::TempDir;

    const KTS: &str = indoc! {r#"
        plugins {
            id("com.android.library")
        }

        android {
            namespace = "com.fongmi.android.tv.vod"
            compileSdk = 34
        }
    "#};

    #[test]
    fn test_insert_into_android_block() {
        let out = insert_resource_prefix(KTS, "vod_").unwrap();
        assert!(out.contains("android {\n    resourcePrefix = \"vod_\"\n    namespace"));
        assert!(has_resource_prefix(&out));
        assert!(!has_resource_prefix(KTS));
    }

    #[test]
    fn test_indented_block_keeps_indent() {
        let src = "subprojects {\n    android {\n        compileSdk = 34\n    }\n}\n";
        let out = insert_resource_prefix(src, "vod_").unwrap();
        assert!(out.contains("    android {\n        resourcePrefix = \"vod_\"\n"));
    }

    #[test]
    fn test_no_android_block() {
        assert_eq!(insert_resource_prefix("plugins {}\n", "vod_"), None);
        // `androidComponents {` is not the android block.
        assert_eq!(insert_resource_prefix("androidComponents {\n}\n", "vod_"), None);
    }

    #[test]
    fn test_configure_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build.gradle.kts");
        fs::write(&path, KTS).unwrap();

        assert_eq!(
            configure(dir.path(), "vod_", false).unwrap(),
            GradleUpdate::Updated(path.clone())
        );
        let once = fs::read_to_string(&path).unwrap();
        assert_eq!(
            configure(dir.path(), "vod_", false).unwrap(),
            GradleUpdate::AlreadySet(path.clone())
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), once);
        assert_eq!(once.matches("resourcePrefix").count(), 1);
    }

    #[test]
    fn test_dry_run_leaves_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build.gradle");
        fs::write(&path, KTS).unwrap();
        assert!(configure(dir.path(), "vod_", true).unwrap().is_ok());
        assert_eq!(fs::read_to_string(&path).unwrap(), KTS);
    }

    #[test]
    fn test_missing_build_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(configure(dir.path(), "vod_", false).unwrap(), GradleUpdate::NoBuildFile);
    }
}
