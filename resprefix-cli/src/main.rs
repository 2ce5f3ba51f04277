mod check;
mod gradle;
mod run;
mod settings;
mod validation;

use std::{io, path::PathBuf, process::ExitCode};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use crate::{
    check::{CheckOptions, run_check_command},
    gradle::run_gradle_command,
    run::{RunCommandOptions, run_run_command},
    settings::{GlobalOptions, load_config},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to ./resprefix.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Module root directory, overriding the config
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Resource prefix, overriding the config
    #[arg(long, global = true)]
    prefix: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Prefix resources and rewrite every reference to them.
    Run {
        /// Module to process, or `all`
        #[arg(short, long, default_value = "all")]
        target: String,

        /// Report what would change without touching any file
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Copy the root aside before changing it
        #[arg(long)]
        backup: bool,

        /// Build command run after the rename, e.g. "./gradlew assembleDebug"
        #[arg(long)]
        verify: Option<String>,

        /// Directory the report file is written to
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },

    /// Check that every module resource carries the prefix.
    Check {
        /// Another res/ directory whose file names must not clash
        #[arg(long)]
        against: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add resourcePrefix to the module's Gradle build file.
    Gradle {
        /// Show the change without writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Commands::Completions { shell } = args.commands {
        clap_complete::generate(shell, &mut Args::command(), "resprefix", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    let global = GlobalOptions {
        config: args.config,
        root: args.root,
        prefix: args.prefix,
    };
    let result = load_config(&global).and_then(|config| match args.commands {
        Commands::Run {
            target,
            dry_run,
            json,
            backup,
            verify,
            report_dir,
        } => run_run_command(
            config,
            RunCommandOptions {
                target,
                dry_run,
                json,
                backup,
                verify,
                report_dir,
            },
        ),
        Commands::Check { against, json } => {
            run_check_command(config, CheckOptions { against, json })
        }
        Commands::Gradle { dry_run } => run_gradle_command(config, dry_run),
        Commands::Completions { .. } => Ok(()),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
