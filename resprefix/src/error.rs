//! All error types for the resprefix crate.
//!
//! [`Error`] is returned from operations that cannot continue (bad config,
//! missing root). Failures that only affect one file are recorded as
//! [`Issue`]s in the run context instead, so a batch always runs to the end.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("XML parse error in `{}`: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown target `{0}`")]
    UnknownTarget(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("verification failed: {0}")]
    Verification(String),
}

impl Error {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn xml(path: impl AsRef<Path>, source: quick_xml::Error) -> Self {
        Error::Xml {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig(message.into())
    }

    /// Attaches the file a parse error came from.
    pub fn at(self, path: impl AsRef<Path>) -> Self {
        match self {
            Error::XmlParse(source) => Error::xml(path, source),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Category of a non-fatal, per-item problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Filesystem or parse failure. The item was skipped and the run fails.
    Error,
    /// The prefixed name already exists. The file was left untouched.
    Collision,
    /// The file is exempt from renaming.
    Skipped,
    /// An expected directory does not exist. Nothing to do there.
    Missing,
}

impl IssueKind {
    pub fn is_failure(self) -> bool {
        matches!(self, IssueKind::Error)
    }
}

/// One recorded problem, tied to the path it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub path: PathBuf,
    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind, path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Issue {
            kind,
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Turns a fatal error into a per-item failure.
    pub fn from_error(path: impl AsRef<Path>, error: &Error) -> Self {
        Issue::new(IssueKind::Error, path, error.to_string())
    }
}
