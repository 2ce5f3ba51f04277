//! Moves resource files to their prefixed names.
//!
//! Files are renamed per identifier, never per file: `drawable-hdpi/icon.png`
//! and `drawable-xhdpi/icon.png` are both `drawable/icon`, so either both get
//! the prefix or neither does. An identifier whose group has an exempt or
//! colliding member keeps its name, in every module of the run: flavor
//! source sets share one `R` namespace.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
};

use tracing::{info, warn};

use crate::{
    context::{RenamedFile, RunContext},
    error::{Error, Issue, IssueKind},
    scanner::ResourceScan,
    types::{ResourceFile, ResourceKey},
};

/// Identifiers of `scan` that must keep their name: those with an exempt
/// file, or with a file whose prefixed name already exists.
pub fn blocked_keys(scan: &ResourceScan, prefix: &str) -> BTreeSet<ResourceKey> {
    let mut blocked: BTreeSet<ResourceKey> = scan.exempt.iter().map(|f| f.key.clone()).collect();
    for file in &scan.eligible {
        if file.prefixed_path(prefix).symlink_metadata().is_ok() {
            blocked.insert(file.key.clone());
        }
    }
    blocked
}

/// Renames every eligible group of `scan` and records the mapping.
///
/// Groups in `ctx.blocked` are left alone even when this module has no
/// exempt or colliding file of its own.
///
/// Returns the number of identifiers renamed.
pub fn rename_resources(scan: &ResourceScan, ctx: &mut RunContext) -> usize {
    let exempt: BTreeSet<&ResourceKey> = scan.exempt.iter().map(|f| &f.key).collect();
    let mut groups: BTreeMap<&ResourceKey, Vec<&ResourceFile>> = BTreeMap::new();
    for file in &scan.eligible {
        groups.entry(&file.key).or_default().push(file);
    }

    let mut renamed = 0;
    for (key, files) in groups {
        if exempt.contains(key) {
            for file in files {
                ctx.record(Issue::new(
                    IssueKind::Skipped,
                    &file.path,
                    format!("`{}` shares its name with an exempt file", key),
                ));
            }
            continue;
        }
        if rename_group(key, &files, ctx) {
            renamed += 1;
        }
    }
    renamed
}

fn rename_group(key: &ResourceKey, files: &[&ResourceFile], ctx: &mut RunContext) -> bool {
    let prefix = ctx.prefix.clone();
    let targets: Vec<_> = files.iter().map(|f| f.prefixed_path(&prefix)).collect();

    let collisions: Vec<usize> = (0..files.len())
        .filter(|&i| targets[i].symlink_metadata().is_ok())
        .collect();
    if !collisions.is_empty() {
        for i in collisions {
            warn!(
                "Not renaming {:?}: {:?} already exists",
                files[i].path, targets[i]
            );
            ctx.record(Issue::new(
                IssueKind::Collision,
                &files[i].path,
                format!("`{}` already exists", targets[i].display()),
            ));
        }
        return false;
    }
    if ctx.blocked.contains(key) {
        for file in files {
            ctx.record(Issue::new(
                IssueKind::Skipped,
                &file.path,
                format!("`{}` is exempt or collides in another module", key),
            ));
        }
        return false;
    }

    let mut moved = 0;
    for (file, target) in files.iter().zip(targets) {
        if ctx.dry_run {
            info!("Would rename file: {:?} -> {:?}", file.path, target);
        } else {
            info!("Renaming file: {:?} -> {:?}", file.path, target);
            if let Err(e) = fs::rename(&file.path, &target) {
                ctx.record(Issue::from_error(&file.path, &Error::io(&file.path, e)));
                continue;
            }
        }
        moved += 1;
        ctx.renamed.push(RenamedFile {
            key: key.clone(),
            from: file.path.clone(),
            to: target,
        });
    }

    if moved == 0 {
        return false;
    }
    let new_name = files[0].prefixed_name(&prefix);
    ctx.mapping.insert(key.clone(), new_name);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, scanner::Scanner, types::ResourceType};
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<x/>").unwrap();
    }

    fn scan(module: &Path) -> ResourceScan {
        let mut config = Config::default();
        config.assets.enabled = false;
        Scanner::new(&config).unwrap().scan_resources(module)
    }

    #[test]
    fn test_renames_all_qualifier_variants() {
        let dir = TempDir::new().unwrap();
        let m = dir.path();
        touch(m, "res/drawable-hdpi/icon.png");
        touch(m, "res/drawable-xhdpi/icon.png");
        touch(m, "res/drawable/btn.9.png");

        let mut ctx = RunContext::new("vod_", false);
        let count = rename_resources(&scan(m), &mut ctx);

        assert_eq!(count, 2);
        assert!(m.join("res/drawable-hdpi/vod_icon.png").exists());
        assert!(m.join("res/drawable-xhdpi/vod_icon.png").exists());
        assert!(m.join("res/drawable/vod_btn.9.png").exists());
        assert!(!m.join("res/drawable-hdpi/icon.png").exists());
        assert_eq!(ctx.mapping.get(ResourceType::Drawable, "icon"), Some("vod_icon"));
        assert_eq!(ctx.mapping.get(ResourceType::Drawable, "btn"), Some("vod_btn"));
        assert_eq!(ctx.renamed.len(), 3);
    }

    #[test]
    fn test_dry_run_records_without_moving() {
        let dir = TempDir::new().unwrap();
        let m = dir.path();
        touch(m, "res/xml/icon.xml");

        let mut ctx = RunContext::new("vod_", true);
        rename_resources(&scan(m), &mut ctx);

        assert!(m.join("res/xml/icon.xml").exists());
        assert!(!m.join("res/xml/vod_icon.xml").exists());
        assert_eq!(ctx.mapping.get(ResourceType::Xml, "icon"), Some("vod_icon"));
    }

    #[test]
    fn test_collision_in_one_variant_blocks_the_group() {
        let dir = TempDir::new().unwrap();
        let m = dir.path();
        touch(m, "res/drawable-hdpi/icon.png");
        touch(m, "res/drawable-xhdpi/icon.png");
        touch(m, "res/drawable-xhdpi/vod_icon.png");

        let mut ctx = RunContext::new("vod_", false);
        let count = rename_resources(&scan(m), &mut ctx);

        assert_eq!(count, 0);
        assert!(m.join("res/drawable-hdpi/icon.png").exists());
        assert!(!m.join("res/drawable-hdpi/vod_icon.png").exists());
        assert!(ctx.mapping.is_empty());
        assert_eq!(ctx.issues_of(IssueKind::Collision).count(), 1);
        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_key_blocked_elsewhere_is_skipped() {
        let dir = TempDir::new().unwrap();
        let main = dir.path().join("main");
        let mobile = dir.path().join("mobile");
        touch(&main, "res/drawable/icon.png");
        touch(&main, "res/drawable/bg.png");
        touch(&mobile, "res/drawable/icon.png");
        touch(&mobile, "res/drawable/vod_icon.png");

        let mut ctx = RunContext::new("vod_", false);
        let (main_scan, mobile_scan) = (scan(&main), scan(&mobile));
        assert!(blocked_keys(&main_scan, "vod_").is_empty());
        ctx.blocked = blocked_keys(&mobile_scan, "vod_");
        assert!(ctx.blocked.contains(&ResourceKey::new(ResourceType::Drawable, "icon")));

        assert_eq!(rename_resources(&main_scan, &mut ctx), 1);
        assert!(main.join("res/drawable/icon.png").exists());
        assert!(main.join("res/drawable/vod_bg.png").exists());
        assert_eq!(ctx.mapping.get(ResourceType::Drawable, "icon"), None);
        assert_eq!(ctx.issues_of(IssueKind::Skipped).count(), 1);
    }

    #[test]
    fn test_exempt_variant_blocks_the_group() {
        let dir = TempDir::new().unwrap();
        let m = dir.path();
        touch(m, "res/mipmap-anydpi-v26/ic_launcher.xml");
        touch(m, "res/mipmap-hdpi/ic_launcher.png");

        let mut ctx = RunContext::new("vod_", false);
        rename_resources(&scan(m), &mut ctx);

        assert!(m.join("res/mipmap-hdpi/ic_launcher.png").exists());
        assert!(ctx.mapping.is_empty());
        assert_eq!(ctx.issues_of(IssueKind::Skipped).count(), 1);
    }
}
