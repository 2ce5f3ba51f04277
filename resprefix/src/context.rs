//! State carried through one run.
//!
//! Every stage takes `&mut RunContext` and adds to it: the mapping grows as
//! files are renamed and declarations are prefixed, and content edits are
//! staged here before they reach the disk. Reads go through the staged
//! content first, so a later stage always sees what an earlier one produced,
//! even in a dry run where nothing is written.

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{error, info};

use crate::{
    error::{Error, Issue, IssueKind, Result},
    types::{ReferenceSite, RenameMapping, ResourceKey},
};

/// A file moved (or, in a dry run, to be moved) by the renamer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamedFile {
    pub key: ResourceKey,
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RunContext {
    pub prefix: String,
    pub dry_run: bool,
    pub mapping: RenameMapping,
    /// Identifiers that keep their name in every module of the run.
    pub blocked: BTreeSet<ResourceKey>,
    pub renamed: Vec<RenamedFile>,
    /// Substitutions per file, summed over all stages.
    pub rewritten: BTreeMap<PathBuf, usize>,
    /// Every reference that was (or would be) rewritten.
    pub sites: Vec<ReferenceSite>,
    pub issues: Vec<Issue>,
    pending: BTreeMap<PathBuf, String>,
}

impl RunContext {
    pub fn new(prefix: impl Into<String>, dry_run: bool) -> Self {
        RunContext {
            prefix: prefix.into(),
            dry_run,
            mapping: RenameMapping::new(),
            blocked: BTreeSet::new(),
            renamed: Vec::new(),
            rewritten: BTreeMap::new(),
            sites: Vec::new(),
            issues: Vec::new(),
            pending: BTreeMap::new(),
        }
    }

    /// Current content of `path`: the staged edit if any, else the file.
    pub fn read(&self, path: &Path) -> Result<Cow<'_, str>> {
        if let Some(content) = self.pending.get(path) {
            return Ok(Cow::Borrowed(content));
        }
        fs::read_to_string(path)
            .map(Cow::Owned)
            .map_err(|e| Error::io(path, e))
    }

    /// Stages new content for `path` and counts its substitutions.
    pub fn stage(&mut self, path: &Path, content: String, substitutions: usize) {
        *self.rewritten.entry(path.to_path_buf()).or_default() += substitutions;
        self.pending.insert(path.to_path_buf(), content);
    }

    pub fn is_staged(&self, path: &Path) -> bool {
        self.pending.contains_key(path)
    }

    /// Writes every staged file. A dry run keeps them staged instead.
    pub fn flush(&mut self) {
        if self.dry_run {
            return;
        }
        for (path, content) in std::mem::take(&mut self.pending) {
            match fs::write(&path, content) {
                Ok(()) => info!("Updated contents of: {:?}", path),
                Err(e) => self.record(Issue::from_error(&path, &Error::io(&path, e))),
            }
        }
    }

    pub fn record(&mut self, issue: Issue) {
        if issue.kind == IssueKind::Error {
            error!("{}: {}", issue.path.display(), issue.message);
        }
        self.issues.push(issue);
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.kind.is_failure())
    }

    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }
}
