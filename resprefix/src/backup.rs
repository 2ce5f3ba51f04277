//! Copies the module root aside before a run changes it.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use ignore::WalkBuilder;
use tracing::info;

use crate::error::{Error, Result};

/// `<root>_backup_<YYYYmmdd_HHMMSS>`, next to `root`.
pub fn backup_path(root: &Path, now: DateTime<Local>) -> PathBuf {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string());
    let backup = format!("{}_backup_{}", name, now.format("%Y%m%d_%H%M%S"));
    match root.parent() {
        Some(parent) => parent.join(backup),
        None => PathBuf::from(backup),
    }
}

/// Copies `root` to its versioned backup path and returns that path.
///
/// `root` is canonicalized first, so `.` or `src/..` still get a sibling
/// backup named after the directory. Fails rather than overwrite an
/// existing backup.
pub fn create_backup(root: &Path, now: DateTime<Local>) -> Result<PathBuf> {
    let root = fs::canonicalize(root).map_err(|e| Error::io(root, e))?;
    let root = root.as_path();
    let target = backup_path(root, now);
    if target.exists() {
        return Err(Error::io(
            &target,
            io::Error::new(io::ErrorKind::AlreadyExists, "backup already exists"),
        ));
    }
    info!("Backing up {:?} to {:?}", root, target);

    // Never copy the backup into itself.
    let skip = target.clone();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(move |entry| entry.path() != skip)
        .build();
    for entry in walker {
        let entry = entry.map_err(|e| Error::io(root, io::Error::other(e.to_string())))?;
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let dest = target.join(relative);
        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            fs::create_dir_all(&dest).map_err(|e| Error::io(&dest, e))?;
        } else if file_type.is_file() {
            fs::copy(entry.path(), &dest).map_err(|e| Error::io(entry.path(), e))?;
        }
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_backup_name() {
        assert_eq!(
            backup_path(Path::new("work/vod"), now()),
            PathBuf::from("work/vod_backup_20240501_093000")
        );
    }

    #[test]
    fn test_backup_copies_tree() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("vod");
        fs::create_dir_all(root.join("src/main/res/xml")).unwrap();
        fs::write(root.join("src/main/res/xml/icon.xml"), "<icon/>").unwrap();
        fs::write(root.join(".gitignore"), "build/").unwrap();

        let backup = create_backup(&root, now()).unwrap();
        assert_eq!(
            backup,
            fs::canonicalize(dir.path()).unwrap().join("vod_backup_20240501_093000")
        );
        assert_eq!(
            fs::read_to_string(backup.join("src/main/res/xml/icon.xml")).unwrap(),
            "<icon/>"
        );
        assert!(backup.join(".gitignore").exists());
    }

    #[test]
    fn test_relative_root_backs_up_beside_the_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("vod");
        fs::create_dir_all(root.join("src/main")).unwrap();
        fs::write(root.join("src/main/a.txt"), "a").unwrap();

        let backup = create_backup(&root.join("src/.."), now()).unwrap();
        let parent = fs::canonicalize(dir.path()).unwrap();
        assert_eq!(backup, parent.join("vod_backup_20240501_093000"));
        assert_eq!(fs::read_to_string(backup.join("src/main/a.txt")).unwrap(), "a");
        assert!(!root.join("vod_backup_20240501_093000").exists());
        assert!(!backup.join("src/vod_backup_20240501_093000").exists());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(create_backup(&dir.path().join("nowhere"), now()).is_err());
    }

    #[test]
    fn test_existing_backup_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("vod");
        fs::create_dir_all(&root).unwrap();
        let existing = backup_path(&root, now());
        fs::create_dir_all(&existing).unwrap();
        fs::write(existing.join("keep.txt"), "old").unwrap();

        assert!(create_backup(&root, now()).is_err());
        assert_eq!(fs::read_to_string(existing.join("keep.txt")).unwrap(), "old");
    }
}
