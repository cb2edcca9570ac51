mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "proctor")]
#[command(about = "Run interview submissions in a time-bounded sandbox")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to $PROCTOR_CONFIG, then built-in defaults)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write logs to a daily-rolling file in this directory
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a source file and print the result as JSON
    Run {
        /// Source file to execute
        file: PathBuf,

        /// Language identifier (javascript, python, cpp, html, ...)
        #[arg(short, long)]
        language: String,

        /// Test cases: inline JSON array or a path to a JSON file
        #[arg(short, long)]
        tests: Option<String>,

        /// Execution timeout in milliseconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Score successful runs with the configured evaluator
        #[arg(long)]
        evaluate: bool,
    },
    /// List supported languages and their strategies
    Languages,
    /// Check which configured toolchains are installed
    Doctor,
    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.verbose, cli.log_file.as_deref())?;

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            file,
            language,
            tests,
            timeout,
            evaluate,
        } => {
            commands::execute_run(
                config,
                commands::RunArgs {
                    file,
                    language,
                    tests,
                    timeout_ms: timeout,
                    evaluate,
                },
            )
            .await
        }
        Commands::Languages => commands::execute_languages(&config.sandbox),
        Commands::Doctor => commands::execute_doctor(&config.sandbox).await,
        Commands::Config => commands::execute_config(&config),
    }
}
