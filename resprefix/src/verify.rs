//! Post-run verification.
//!
//! [`check`] inspects a module set without changing it: files that still
//! lack the prefix, file names that clash with another resource tree, and
//! references that point at nothing the modules declare.
//! [`run_verify_command`] runs an external build and reports its status.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{Display, Formatter},
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::{Error, Issue, IssueKind, Result},
    formats::{FileFormat, Syntax, markup, source},
    gradle,
    scanner::Scanner,
    types::{ReferenceSite, ResourceType, display_path, field_name, resource_name},
};

/// Exit status of the verify command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyOutcome {
    pub command: String,
    pub success: bool,
    /// `None` when the process was killed by a signal.
    pub status: Option<i32>,
}

impl Display for VerifyOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let verdict = if self.success { "passed" } else { "failed" };
        match self.status {
            Some(code) => write!(f, "{} (`{}` exited with {})", verdict, self.command, code),
            None => write!(f, "{} (`{}` was terminated)", verdict, self.command),
        }
    }
}

/// Runs `command` through the platform shell in the working directory.
///
/// A command that cannot be started at all is an error; a command that
/// runs and fails is a failed [`VerifyOutcome`].
pub fn run_verify_command(command: &str) -> Result<VerifyOutcome> {
    info!("Running verify command: {}", command);
    let mut shell = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C");
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c");
        c
    };
    let status = shell
        .arg(command)
        .status()
        .map_err(|e| Error::Verification(format!("could not start `{}`: {}", command, e)))?;
    if !status.success() {
        warn!("Verify command failed: {}", status);
    }
    Ok(VerifyOutcome {
        command: command.to_string(),
        success: status.success(),
        status: status.code(),
    })
}

/// A file name present both in the module set and in the tree checked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub file_name: String,
    pub path: PathBuf,
    pub other: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    /// Eligible files still lacking the prefix.
    pub violations: Vec<PathBuf>,
    pub conflicts: Vec<Conflict>,
    /// References to identifiers no module declares. Warnings only, since
    /// they may come from libraries.
    pub unresolved: Vec<ReferenceSite>,
    /// Whether the Gradle build declares a `resourcePrefix`.
    pub gradle_prefix: Option<bool>,
    pub issues: Vec<Issue>,
}

impl CheckReport {
    pub fn success(&self) -> bool {
        self.violations.is_empty()
            && self.conflicts.is_empty()
            && !self.issues.iter().any(|i| i.kind.is_failure())
    }
}

impl Display for CheckReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Unprefixed files ({}):", self.violations.len())?;
        for path in &self.violations {
            writeln!(f, "  {}", display_path(path))?;
        }
        writeln!(f, "Conflicts ({}):", self.conflicts.len())?;
        for c in &self.conflicts {
            writeln!(
                f,
                "  {}: {} and {}",
                c.file_name,
                display_path(&c.path),
                display_path(&c.other)
            )?;
        }
        writeln!(f, "Unresolved references ({}):", self.unresolved.len())?;
        for site in &self.unresolved {
            writeln!(
                f,
                "  {}@{}: {}/{}",
                display_path(&site.path),
                site.offset,
                site.res_type,
                site.identifier
            )?;
        }
        match self.gradle_prefix {
            Some(true) => writeln!(f, "Gradle resourcePrefix: set")?,
            Some(false) => writeln!(f, "Gradle resourcePrefix: missing")?,
            None => writeln!(f, "Gradle resourcePrefix: no build file")?,
        }
        for issue in self.issues.iter().filter(|i| i.kind.is_failure()) {
            writeln!(f, "error: {}: {}", display_path(&issue.path), issue.message)?;
        }
        write!(f, "Result: {}", if self.success() { "success" } else { "failed" })
    }
}

/// Checks every configured module, optionally against another `res/` tree.
pub fn check(config: &Config, against: Option<&Path>) -> Result<CheckReport> {
    config.validate()?;
    if !config.root.is_dir() {
        return Err(Error::io(
            &config.root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "root directory not found"),
        ));
    }

    let scanner = Scanner::new(config)?;
    let mut report = CheckReport::default();
    let module_dirs: Vec<PathBuf> = config
        .modules
        .iter()
        .map(|m| config.module_path(m))
        .filter(|dir| dir.is_dir())
        .collect();

    for dir in &module_dirs {
        let scan = scanner.scan_resources(dir);
        report.violations.extend(scan.eligible.into_iter().map(|f| f.path));
        report
            .issues
            .extend(scan.issues.into_iter().filter(|i| i.kind.is_failure()));
    }

    if let Some(against) = against {
        report.conflicts = find_conflicts(config, &module_dirs, against);
    }

    let declared = declared_identifiers(config, &scanner, &module_dirs, &mut report.issues)?;
    for dir in &module_dirs {
        find_unresolved(config, &scanner, dir, &declared, &mut report);
    }

    report.gradle_prefix = gradle::build_file(&config.root)
        .map(|path| fs::read_to_string(&path).map_err(|e| Error::io(&path, e)))
        .transpose()?
        .map(|content| gradle::has_resource_prefix(&content));

    Ok(report)
}

/// File names of the non-shared resource directories under `res_dir`.
fn resource_file_names(config: &Config, res_dir: &Path) -> BTreeMap<String, PathBuf> {
    let mut names = BTreeMap::new();
    let Ok(dirs) = fs::read_dir(res_dir) else {
        return names;
    };
    let mut dirs: Vec<PathBuf> = dirs.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    dirs.sort();
    for dir in dirs {
        let Some(dir_name) = dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !dir.is_dir() || config.is_shared_dir(dir_name) {
            continue;
        }
        let Ok(files) = fs::read_dir(&dir) else {
            continue;
        };
        for file in files.filter_map(|e| e.ok()).map(|e| e.path()) {
            if let Some(name) = file.file_name().and_then(|n| n.to_str()) {
                if file.is_file() && !name.starts_with('.') {
                    names.entry(name.to_string()).or_insert_with(|| file.clone());
                }
            }
        }
    }
    names
}

fn find_conflicts(config: &Config, module_dirs: &[PathBuf], against: &Path) -> Vec<Conflict> {
    let theirs = resource_file_names(config, against);
    let mut conflicts = Vec::new();
    for dir in module_dirs {
        for (name, path) in resource_file_names(config, &dir.join("res")) {
            if let Some(other) = theirs.get(&name) {
                conflicts.push(Conflict {
                    file_name: name,
                    path,
                    other: other.clone(),
                });
            }
        }
    }
    conflicts
}

/// Every identifier the modules provide, in both name and field form.
fn declared_identifiers(
    config: &Config,
    scanner: &Scanner,
    module_dirs: &[PathBuf],
    issues: &mut Vec<Issue>,
) -> Result<BTreeSet<(ResourceType, String)>> {
    let tags = config.declaration_types()?;
    let mut declared = BTreeSet::new();
    let mut add = |res_type: ResourceType, name: &str| {
        declared.insert((res_type, field_name(name)));
        declared.insert((res_type, name.to_string()));
    };

    for dir in module_dirs {
        let res_dir = dir.join("res");
        if let Ok(entries) = fs::read_dir(&res_dir) {
            for entry in entries.filter_map(|e| e.ok()) {
                let dir_name = entry.file_name().to_string_lossy().into_owned();
                let Some((res_type, _)) = ResourceType::from_dir_name(&dir_name) else {
                    continue;
                };
                let Ok(files) = fs::read_dir(entry.path()) else {
                    continue;
                };
                for file in files.filter_map(|e| e.ok()) {
                    add(res_type, resource_name(&file.file_name().to_string_lossy()));
                }
            }
        }

        for path in scanner.value_files(dir).items {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    issues.push(Issue::from_error(&path, &Error::io(&path, e)));
                    continue;
                }
            };
            let doc = match markup::Document::parse(&content) {
                Ok(doc) => doc,
                Err(e) => {
                    issues.push(Issue::from_error(&path, &Error::xml(&path, e)));
                    continue;
                }
            };
            let mut styleable: Option<&str> = None;
            for element in &doc.elements {
                let name = element.attribute("name").map(|a| content[a.value.clone()].trim());
                if element.name == "declare-styleable" {
                    styleable = name;
                } else if element.name == "attr"
                    && element.parent.as_deref() == Some("declare-styleable")
                {
                    // R.styleable.<Styleable>_<attr>, `android:text` as `android_text`.
                    if let (Some(styleable), Some(attr)) = (styleable, name) {
                        let combined = format!("{}_{}", styleable, attr.replace(':', "_"));
                        add(ResourceType::Styleable, &combined);
                    }
                }
                let Some((_, res_type)) = tags.iter().find(|(tag, _)| *tag == element.name) else {
                    continue;
                };
                if let Some(name) = name {
                    add(*res_type, name);
                }
            }
        }
    }
    debug!("{} identifiers declared", declared.len());
    Ok(declared)
}

fn find_unresolved(
    config: &Config,
    scanner: &Scanner,
    module_dir: &Path,
    declared: &BTreeSet<(ResourceType, String)>,
    report: &mut CheckReport,
) {
    let Ok(checked) = config.resource_types() else {
        return;
    };
    let Ok(tags) = config.declaration_types() else {
        return;
    };
    let in_scope = |t: ResourceType| checked.contains(&t) || tags.iter().any(|(_, d)| *d == t);

    for file in scanner.text_files(module_dir).items {
        let tokens = match file.format {
            FileFormat::Markup => {
                let Ok(content) = fs::read_to_string(&file.path) else {
                    continue;
                };
                match markup::find_references(&content) {
                    Ok(tokens) => tokens,
                    Err(e) => {
                        report
                            .issues
                            .push(Issue::new(IssueKind::Error, &file.path, e.to_string()));
                        continue;
                    }
                }
            }
            FileFormat::Source => {
                let Ok(content) = fs::read_to_string(&file.path) else {
                    continue;
                };
                source::find_references(&content)
            }
            FileFormat::AssetText => continue,
        };
        for token in tokens {
            let explicit = matches!(token.syntax, Syntax::ResourceLink | Syntax::FieldAccess);
            if !explicit || !in_scope(token.res_type) {
                continue;
            }
            if !declared.contains(&(token.res_type, token.name.clone())) {
                report.unresolved.push(ReferenceSite {
                    path: file.path.clone(),
                    offset: token.range.start,
                    res_type: token.res_type,
                    identifier: token.name,
                });
            }
        }
    }
}
