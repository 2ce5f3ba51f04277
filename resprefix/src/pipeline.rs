//! One complete run: scan, rename, prefix declarations, rewrite references.
//!
//! References are rewritten strictly after every rename and declaration of
//! the run is known, and across every configured module, because all flavor
//! source sets of a module share one `R` namespace.

use std::io;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::{
    backup,
    config::{Config, Target},
    context::RunContext,
    declarations,
    error::{Error, Issue, IssueKind, Result},
    references, renamer,
    report::RunReport,
    scanner::Scanner,
    verify,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub target: Target,
    /// Compute and report everything, change nothing.
    pub dry_run: bool,
}

/// Runs the pipeline at the current time.
pub fn run(config: &Config, options: &RunOptions) -> Result<RunReport> {
    run_at(config, options, Local::now())
}

/// Runs the pipeline, stamping the report and backup with `now`.
pub fn run_at(config: &Config, options: &RunOptions, now: DateTime<Local>) -> Result<RunReport> {
    config.validate()?;
    let targets = config.resolve_target(&options.target)?;
    if !config.root.is_dir() {
        return Err(Error::io(
            &config.root,
            io::Error::new(io::ErrorKind::NotFound, "root directory not found"),
        ));
    }
    let backup = if config.backup && !options.dry_run {
        Some(backup::create_backup(&config.root, now)?)
    } else {
        None
    };

    let scanner = Scanner::new(config)?;
    let tags = config.declaration_types()?;
    let mut ctx = RunContext::new(&config.prefix, options.dry_run);

    // Every target is scanned before anything is renamed, so a key blocked
    // in one module is blocked in all of them.
    let mut scans = Vec::new();
    for module in &targets {
        let dir = config.module_path(module);
        if !dir.is_dir() {
            ctx.record(Issue::new(IssueKind::Missing, &dir, "module directory does not exist"));
            continue;
        }
        let scan = scanner.scan_resources(&dir);
        for issue in scan.issues.iter().cloned() {
            ctx.record(issue);
        }
        ctx.blocked.extend(renamer::blocked_keys(&scan, &ctx.prefix));
        scans.push((module, dir, scan));
    }
    debug!("{} identifiers keep their name", ctx.blocked.len());

    for (module, dir, scan) in &scans {
        info!("Processing module {}: {:?}", module.name, dir);
        let renamed = renamer::rename_resources(scan, &mut ctx);

        let values = scanner.value_files(dir);
        for issue in values.issues {
            ctx.record(issue);
        }
        let declared = declarations::rewrite_declarations(&values.items, &tags, &mut ctx);
        ctx.flush();
        info!(
            "Module {}: {} resources renamed, {} declarations prefixed",
            module.name, renamed, declared
        );
    }

    let mut files = Vec::new();
    for module in &config.modules {
        let dir = config.module_path(module);
        if !dir.is_dir() {
            continue;
        }
        let text = scanner.text_files(&dir);
        for issue in text.issues {
            ctx.record(issue);
        }
        files.extend(text.items);
    }
    let rewritten = references::rewrite_references(&files, &mut ctx);
    ctx.flush();
    info!("{} references rewritten in {} mapped identifiers", rewritten, ctx.mapping.len());

    let modules = targets.iter().map(|m| m.name.clone()).collect();
    let mut report = RunReport::new(ctx, modules, now);
    report.backup = backup;

    if let Some(command) = config.verify_command.as_deref().filter(|_| !options.dry_run) {
        match verify::run_verify_command(command) {
            Ok(outcome) => report.verification = Some(outcome),
            Err(e) => report.issues.push(Issue::from_error(&config.root, &e)),
        }
    }
    Ok(report)
}
