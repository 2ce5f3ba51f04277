use std::path::PathBuf;

use resprefix::{Config, IssueKind, RunOptions, RunReport, run};
use tracing::info;

use crate::validation::{validate_directory, validate_report_dir, validate_target};

#[derive(Debug, Clone)]
pub struct RunCommandOptions {
    pub target: String,
    pub dry_run: bool,
    pub json: bool,
    pub backup: bool,
    pub verify: Option<String>,
    pub report_dir: Option<PathBuf>,
}

fn print_summary(report: &RunReport) {
    println!("=== resprefix ===");
    println!("Prefix: {}", report.prefix);
    println!("Modules: {}", report.modules.join(", "));
    println!("Renamed resources: {}", report.mapping.len());
    println!("Renamed files: {}", report.renamed.len());
    println!(
        "Rewritten files: {} ({} references)",
        report.rewritten.len(),
        report.substitutions()
    );
    println!(
        "Issues: {} errors, {} collisions, {} skipped",
        report.count(IssueKind::Error),
        report.count(IssueKind::Collision),
        report.count(IssueKind::Skipped)
    );
    if let Some(backup) = &report.backup {
        println!("Backup: {}", backup.display());
    }
    if let Some(outcome) = &report.verification {
        println!("Verification: {}", outcome);
    }
}

pub fn run_run_command(mut config: Config, opts: RunCommandOptions) -> Result<(), String> {
    validate_directory(&config.root, "Root directory")?;
    let target = validate_target(&opts.target, &config)?;
    if opts.backup {
        config.backup = true;
    }
    if let Some(command) = opts.verify {
        config.verify_command = Some(command);
    }
    if let Some(dir) = opts.report_dir {
        config.report_dir = dir;
    }

    let report = run(
        &config,
        &RunOptions {
            target,
            dry_run: opts.dry_run,
        },
    )
    .map_err(|e| format!("Run failed: {}", e))?;

    if !opts.dry_run {
        validate_report_dir(&config.report_dir)?;
        let path = report
            .write_to(&config.report_dir)
            .map_err(|e| format!("Failed to write report: {}", e))?;
        info!("Report written to {:?}", path);
        if !opts.json {
            print_summary(&report);
            println!("Report: {}", path.display());
        }
    }

    if opts.json {
        let text = report
            .to_json()
            .map_err(|e| format!("Failed to serialize report JSON: {}", e))?;
        println!("{}", text);
    } else if opts.dry_run {
        println!("{}", report);
    }

    let errors = report.count(IssueKind::Error);
    if errors > 0 {
        return Err(format!("{} item(s) failed; see the report for details", errors));
    }
    match &report.verification {
        Some(outcome) if !outcome.success => Err(format!("Verification {}", outcome)),
        _ => Ok(()),
    }
}
