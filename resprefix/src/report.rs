//! Summary of a run, as plain text or JSON.

use std::{
    fmt::{Display, Formatter},
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::{
    context::{RenamedFile, RunContext},
    error::{Error, Issue, IssueKind, Result},
    types::{ReferenceSite, RenameMapping, display_path},
    verify::VerifyOutcome,
};

/// A file whose content was (or would be) changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewrittenFile {
    pub path: PathBuf,
    pub substitutions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub prefix: String,
    pub dry_run: bool,
    pub generated_at: String,
    pub modules: Vec<String>,
    pub mapping: RenameMapping,
    pub renamed: Vec<RenamedFile>,
    pub rewritten: Vec<RewrittenFile>,
    /// Individual rewritten references, kept for dry-run previews.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sites: Vec<ReferenceSite>,
    pub issues: Vec<Issue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerifyOutcome>,
    #[serde(skip)]
    stamp: String,
}

impl RunReport {
    pub fn new(ctx: RunContext, modules: Vec<String>, now: DateTime<Local>) -> Self {
        let rewritten = ctx
            .rewritten
            .into_iter()
            .map(|(path, substitutions)| RewrittenFile {
                path,
                substitutions,
            })
            .collect();
        RunReport {
            prefix: ctx.prefix,
            dry_run: ctx.dry_run,
            generated_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            modules,
            mapping: ctx.mapping,
            renamed: ctx.renamed,
            rewritten,
            sites: if ctx.dry_run { ctx.sites } else { Vec::new() },
            issues: ctx.issues,
            backup: None,
            verification: None,
            stamp: now.format("%Y%m%d_%H%M%S").to_string(),
        }
    }

    /// True when no item failed and verification (if run) passed.
    pub fn success(&self) -> bool {
        !self.issues.iter().any(|i| i.kind.is_failure())
            && self.verification.as_ref().is_none_or(|v| v.success)
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    pub fn substitutions(&self) -> usize {
        self.rewritten.iter().map(|f| f.substitutions).sum()
    }

    /// `resprefix_report_<YYYYmmdd_HHMMSS>.txt`
    pub fn file_name(&self) -> String {
        format!("resprefix_report_{}.txt", self.stamp)
    }

    /// Writes the text report into `dir` and returns its path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        let path = dir.join(self.file_name());
        fs::write(&path, self.to_string()).map_err(|e| Error::io(&path, e))?;
        Ok(path)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mode = if self.dry_run { " (dry run)" } else { "" };
        writeln!(f, "resprefix report{}", mode)?;
        writeln!(f, "generated: {}", self.generated_at)?;
        writeln!(f, "prefix: {}", self.prefix)?;
        writeln!(f, "modules: {}", self.modules.join(", "))?;
        if let Some(backup) = &self.backup {
            writeln!(f, "backup: {}", display_path(backup))?;
        }

        writeln!(f, "\nRenamed resources ({}):", self.mapping.len())?;
        for (key, new_name) in self.mapping.iter() {
            writeln!(f, "  {} -> {}", key, new_name)?;
        }

        writeln!(f, "\nRenamed files ({}):", self.renamed.len())?;
        for file in &self.renamed {
            writeln!(
                f,
                "  {} -> {}",
                display_path(&file.from),
                display_path(&file.to)
            )?;
        }

        writeln!(
            f,
            "\nRewritten files ({}, {} references):",
            self.rewritten.len(),
            self.substitutions()
        )?;
        for file in &self.rewritten {
            writeln!(f, "  {} ({})", display_path(&file.path), file.substitutions)?;
        }

        if !self.sites.is_empty() {
            writeln!(f, "\nReferences:")?;
            for site in &self.sites {
                writeln!(
                    f,
                    "  {}@{}: {}/{}",
                    display_path(&site.path),
                    site.offset,
                    site.res_type,
                    site.identifier
                )?;
            }
        }

        let reported: Vec<&Issue> = self
            .issues
            .iter()
            .filter(|i| i.kind != IssueKind::Missing)
            .collect();
        if !reported.is_empty() {
            writeln!(f, "\nIssues ({}):", reported.len())?;
            for issue in reported {
                writeln!(
                    f,
                    "  [{}] {}: {}",
                    issue_label(issue.kind),
                    display_path(&issue.path),
                    issue.message
                )?;
            }
        }

        if let Some(outcome) = &self.verification {
            writeln!(f, "\nVerification: {}", outcome)?;
        }

        let result = if self.success() { "success" } else { "failed" };
        write!(f, "\nResult: {}", result)
    }
}

fn issue_label(kind: IssueKind) -> &'static str {
    match kind {
        IssueKind::Error => "error",
        IssueKind::Collision => "collision",
        IssueKind::Skipped => "skipped",
        IssueKind::Missing => "missing",
    }
}
