//! CLI definitions and entry point

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use super::commands::{self, TestArgs};
use p5::output::OutputMode;

/// p5 - Run your checks and find the commit that broke them
#[derive(Parser, Debug)]
#[command(
    name = "p5",
    version,
    about = "Run build and test checks and point at the likely culprit",
    long_about = "Run the configured lint, typecheck, build and test tasks.\n\n\
                  When a task fails, the files named in its output are matched against\n\
                  the commits on the current branch to list the likely suspects."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the tasks configured for a stage
    Test {
        /// Stage to run: pre-commit, pre-push, ci
        stage: Option<String>,

        /// Run every registered task instead of the stage list
        #[arg(short, long)]
        all: bool,

        /// Do not echo commands or stream their output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show version
    Version,
}

/// Run the CLI
pub fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    match cli.command {
        Some(Command::Test { stage, all, quiet }) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(async {
                let cancel = CancellationToken::new();
                let watcher = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        log::warn!("Interrupted, stopping running task");
                        watcher.cancel();
                    }
                });

                let args = TestArgs { stage, all, quiet };
                commands::test(&args, output_mode, cancel).await
            })
        },
        Some(Command::Version) => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": p5::VERSION
                    })
                );
            } else {
                println!("p5 v{}", p5::VERSION);
            }
            Ok(ExitCode::SUCCESS)
        },
        None => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": p5::VERSION,
                        "hint": "Use --help for usage"
                    })
                );
            } else {
                println!("p5 v{}", p5::VERSION);
                println!("\nRun 'p5 --help' for usage");
                println!("Run 'p5 test' to run the pre-commit tasks");
            }
            Ok(ExitCode::SUCCESS)
        },
    }
}
