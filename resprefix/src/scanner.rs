//! Finds the files of a module: resources eligible for renaming, value files
//! for declaration rewriting and text files that may hold references.
//!
//! All results are sorted by path, so a run is deterministic.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::debug;

use crate::{
    config::Config,
    error::{Issue, IssueKind, Result},
    formats::{FileFormat, infer_format_from_extension},
    types::{ResourceFile, ResourceKey, ResourceType, display_path, resource_name},
};

/// Files found under one directory plus any problems met on the way.
#[derive(Debug, Clone)]
pub struct ScanResult<T> {
    pub items: Vec<T>,
    pub issues: Vec<Issue>,
}

impl<T> Default for ScanResult<T> {
    fn default() -> Self {
        ScanResult {
            items: Vec::new(),
            issues: Vec::new(),
        }
    }
}

/// Resources of a module, split by whether they may be renamed.
#[derive(Debug, Clone, Default)]
pub struct ResourceScan {
    /// Unprefixed files eligible for renaming.
    pub eligible: Vec<ResourceFile>,
    /// Files whose name is exempt. Their identifier must not change either.
    pub exempt: Vec<ResourceFile>,
    pub issues: Vec<Issue>,
}

/// A file that may contain references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    pub path: PathBuf,
    pub format: FileFormat,
}

pub struct Scanner<'a> {
    config: &'a Config,
    resource_types: Vec<ResourceType>,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        Ok(Scanner {
            config,
            resource_types: config.resource_types()?,
        })
    }

    /// Lists the renamable resources of the module at `module_dir`.
    pub fn scan_resources(&self, module_dir: &Path) -> ResourceScan {
        let mut scan = ResourceScan::default();
        let res_dir = module_dir.join("res");
        if res_dir.is_dir() {
            self.scan_res_dir(&res_dir, &mut scan);
        } else {
            scan.issues.push(missing(&res_dir));
        }
        if self.config.assets.enabled {
            let assets_dir = module_dir.join("assets");
            if assets_dir.is_dir() {
                self.scan_assets_dir(&assets_dir, &mut scan);
            } else {
                scan.issues.push(missing(&assets_dir));
            }
        }
        scan.eligible.sort_by(|a, b| a.path.cmp(&b.path));
        scan.exempt.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(
            "Scanned {:?}: {} eligible, {} exempt",
            module_dir,
            scan.eligible.len(),
            scan.exempt.len()
        );
        scan
    }

    fn scan_res_dir(&self, res_dir: &Path, scan: &mut ResourceScan) {
        let files = walk(res_dir, Some(2), &self.config.shared_dir_marker);
        scan.issues.extend(files.issues);

        for path in files.items {
            let Some(dir_name) = parent_name(&path) else {
                continue;
            };
            let Some((res_type, qualifier)) = ResourceType::from_dir_name(&dir_name) else {
                continue;
            };
            if !self.resource_types.contains(&res_type) || path.parent() == Some(res_dir) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let key = ResourceKey::new(res_type, resource_name(file_name));
            let file = ResourceFile {
                path: path.clone(),
                key,
                qualifier,
            };
            self.classify(file, scan);
        }
    }

    fn scan_assets_dir(&self, assets_dir: &Path, scan: &mut ResourceScan) {
        let images = assets_dir.join(&self.config.assets.images_dir);
        let mut paths = Vec::new();
        if images.is_dir() {
            let files = walk(&images, None, &self.config.shared_dir_marker);
            scan.issues.extend(files.issues);
            paths.extend(files.items);
        }
        for name in &self.config.assets.root_files {
            let path = assets_dir.join(name);
            if path.is_file() {
                paths.push(path);
            }
        }

        for path in paths {
            let Ok(relative) = path.strip_prefix(assets_dir) else {
                continue;
            };
            let file = ResourceFile {
                key: ResourceKey::new(ResourceType::Asset, display_path(relative)),
                path,
                qualifier: None,
            };
            self.classify(file, scan);
        }
    }

    fn classify(&self, file: ResourceFile, scan: &mut ResourceScan) {
        let file_name = file.file_name();
        if file_name.starts_with('.') || file_name.starts_with(&self.config.prefix) {
            return;
        }
        if self.config.is_exempt(file_name) {
            scan.issues.push(Issue::new(
                IssueKind::Skipped,
                &file.path,
                format!("`{}` is exempt from renaming", file_name),
            ));
            scan.exempt.push(file);
            return;
        }
        scan.eligible.push(file);
    }

    /// Value files (`res/values*/*.xml`) of a module.
    pub fn value_files(&self, module_dir: &Path) -> ScanResult<PathBuf> {
        let res_dir = module_dir.join("res");
        if !res_dir.is_dir() {
            return ScanResult::default();
        }
        // Shared directories are exactly what we want here, so walk unfiltered.
        let mut files = walk(&res_dir, Some(2), "");
        files.items.retain(|path| {
            path.extension().is_some_and(|e| e == "xml")
                && path.parent() != Some(res_dir.as_path())
                && parent_name(path).is_some_and(|d| self.config.is_shared_dir(&d))
        });
        files
    }

    /// Every file of a module that may hold a reference.
    pub fn text_files(&self, module_dir: &Path) -> ScanResult<TextFile> {
        let config = self.config;
        let mut result = ScanResult::default();
        let mut add = |root: PathBuf, keep: &dyn Fn(FileFormat) -> bool| {
            if !root.exists() {
                return;
            }
            let files = walk(&root, None, "");
            result.issues.extend(files.issues);
            for path in files.items {
                let format = infer_format_from_extension(
                    &path,
                    &config.source_extensions,
                    &config.assets.text_extensions,
                );
                if let Some(format) = format.filter(|f| keep(*f)) {
                    result.items.push(TextFile { path, format });
                }
            }
        };

        add(module_dir.join("res"), &|f| f == FileFormat::Markup);
        add(module_dir.join("AndroidManifest.xml"), &|f| f == FileFormat::Markup);
        for dir in &config.source_dirs {
            add(module_dir.join(dir), &|f| f == FileFormat::Source);
        }
        if config.assets.enabled {
            add(module_dir.join("assets"), &|f| f == FileFormat::AssetText);
        }

        result.items.sort_by(|a, b| a.path.cmp(&b.path));
        result.items.dedup();
        result
    }
}

fn missing(path: &Path) -> Issue {
    Issue::new(IssueKind::Missing, path, "directory does not exist")
}

fn parent_name(path: &Path) -> Option<String> {
    path.parent()?
        .file_name()?
        .to_str()
        .map(str::to_string)
}

/// Regular files under `root`, in file name order.
///
/// Directories whose name contains `skip_marker` are not entered; an empty
/// marker enters everything. `root` may also be a single file.
fn walk(root: &Path, max_depth: Option<usize>, skip_marker: &str) -> ScanResult<PathBuf> {
    let marker = skip_marker.to_string();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .max_depth(max_depth)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            marker.is_empty()
                || entry.depth() == 0
                || !is_dir
                || !entry.file_name().to_string_lossy().contains(&marker)
        })
        .build();

    let mut result = ScanResult::default();
    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_some_and(|t| t.is_file()) => {
                result.items.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => result.issues.push(Issue::new(IssueKind::Error, root, e.to_string())),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<x/>").unwrap();
    }

    fn names(files: &[ResourceFile]) -> Vec<String> {
        files.iter().map(|f| f.key.to_string()).collect()
    }

    #[test]
    fn test_scan_resources() {
        let dir = TempDir::new().unwrap();
        let m = dir.path();
        touch(m, "res/layout/activity_main.xml");
        touch(m, "res/drawable-hdpi/icon.png");
        touch(m, "res/drawable-xhdpi/icon.png");
        touch(m, "res/drawable/btn_bg.9.png");
        touch(m, "res/drawable/vod_done.xml");
        touch(m, "res/drawable/.hidden.png");
        touch(m, "res/values/strings.xml");
        touch(m, "res/raw/sound.mp3");
        touch(m, "res/xml/file_paths.xml");

        let config = Config::default();
        let scan = Scanner::new(&config).unwrap().scan_resources(m);
        assert_eq!(
            names(&scan.eligible),
            vec!["drawable/btn_bg", "drawable/icon", "drawable/icon", "layout/activity_main"]
        );
        assert_eq!(names(&scan.exempt), vec!["xml/file_paths"]);
        assert_eq!(scan.eligible[1].qualifier.as_deref(), Some("hdpi"));
        assert!(scan.issues.iter().any(|i| i.kind == IssueKind::Skipped));
        // assets/ is absent
        assert!(scan.issues.iter().any(|i| i.kind == IssueKind::Missing));
    }

    #[test]
    fn test_scan_assets() {
        let dir = TempDir::new().unwrap();
        let m = dir.path();
        touch(m, "res/layout/main.xml");
        touch(m, "assets/images/logo.png");
        touch(m, "assets/images/sub/bg.jpg");
        touch(m, "assets/favicon.ico");
        touch(m, "assets/index.html");

        let config = Config::default();
        let scan = Scanner::new(&config).unwrap().scan_resources(m);
        assert_eq!(
            names(&scan.eligible),
            vec!["asset/favicon.ico", "asset/images/logo.png", "asset/images/sub/bg.jpg", "layout/main"]
        );
        assert!(scan.issues.is_empty());
    }

    #[test]
    fn test_missing_res_dir() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.assets.enabled = false;
        let scan = Scanner::new(&config).unwrap().scan_resources(dir.path());
        assert!(scan.eligible.is_empty());
        assert_eq!(scan.issues.len(), 1);
        assert_eq!(scan.issues[0].kind, IssueKind::Missing);
    }

    #[test]
    fn test_value_and_text_files() {
        let dir = TempDir::new().unwrap();
        let m = dir.path();
        touch(m, "res/values/strings.xml");
        touch(m, "res/values-zh-rCN/strings.xml");
        touch(m, "res/layout/main.xml");
        touch(m, "AndroidManifest.xml");
        touch(m, "java/com/app/Main.java");
        touch(m, "java/com/app/notes.txt");
        touch(m, "kotlin/com/app/View.kt");
        touch(m, "assets/index.html");
        touch(m, "assets/images/logo.png");

        let config = Config::default();
        let scanner = Scanner::new(&config).unwrap();

        let values = scanner.value_files(m);
        assert_eq!(
            values.items,
            vec![m.join("res/values/strings.xml"), m.join("res/values-zh-rCN/strings.xml")]
        );

        let text = scanner.text_files(m);
        let found: Vec<(PathBuf, FileFormat)> =
            text.items.into_iter().map(|t| (t.path, t.format)).collect();
        assert_eq!(
            found,
            vec![
                (m.join("AndroidManifest.xml"), FileFormat::Markup),
                (m.join("assets/index.html"), FileFormat::AssetText),
                (m.join("java/com/app/Main.java"), FileFormat::Source),
                (m.join("kotlin/com/app/View.kt"), FileFormat::Source),
                (m.join("res/layout/main.xml"), FileFormat::Markup),
                (m.join("res/values/strings.xml"), FileFormat::Markup),
                (m.join("res/values-zh-rCN/strings.xml"), FileFormat::Markup),
            ]
        );
    }

    #[test]
    fn test_text_files_of_empty_module() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let text = Scanner::new(&config).unwrap().text_files(dir.path());
        assert!(text.items.is_empty());
        assert!(text.issues.is_empty());
    }

    #[test]
    fn test_rescan_after_prefixing_is_empty() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "res/layout/vod_main.xml");
        touch(dir.path(), "res/drawable/vod_icon.png");
        let mut config = Config::default();
        config.assets.enabled = false;
        let scan = Scanner::new(&config).unwrap().scan_resources(dir.path());
        assert!(scan.eligible.is_empty());
    }
}
