#![forbid(unsafe_code)]
//! Resource prefixing for Android modules.
//!
//! Gives every resource of a module a common prefix (for example `vod_`) so
//! the module can be merged into an app without identifier collisions, and
//! rewrites every reference to a renamed resource.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use resprefix::{Config, RunOptions, run};
//!
//! let config = Config::load("resprefix.toml")?;
//! let report = run(&config, &RunOptions { dry_run: true, ..Default::default() })?;
//! println!("{}", report);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Stages
//!
//! - **Scanner**: eligible resource files per module (`res/layout`, `res/drawable-hdpi`, `assets/images`)
//! - **Renamer**: moves each identifier's files as a unit, skipping collisions and exemptions
//! - **Declarations**: prefixes `<string name="...">` and friends in `values*` directories
//! - **References**: rewrites `@drawable/x`, `?attr/x`, `R.drawable.x` and asset paths
//! - **Report / verify**: plain-text or JSON summary, consistency check, build command
//!
//! Files that cannot be processed are recorded as [`Issue`]s and the batch
//! runs to the end; only configuration problems stop a run early.

pub mod backup;
pub mod config;
pub mod context;
pub mod declarations;
pub mod error;
pub mod formats;
pub mod gradle;
pub mod pipeline;
pub mod references;
pub mod renamer;
pub mod report;
pub mod scanner;
pub mod traits;
pub mod types;
pub mod verify;

// Re-export most used types for easy consumption
pub use crate::{
    config::{Config, ModuleConfig, Target},
    context::RunContext,
    error::{Error, Issue, IssueKind, Result},
    formats::{FileFormat, infer_format_from_extension},
    pipeline::{RunOptions, run},
    report::RunReport,
    types::{RenameMapping, ResourceFile, ResourceKey, ResourceType},
    verify::{CheckReport, check},
};
