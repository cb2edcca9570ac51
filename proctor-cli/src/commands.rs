//! CLI command implementations

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use proctor_common::{Submission, TestCase};
use proctor_sandbox::{LanguageRegistry, ProcessRunner, SandboxConfig, SandboxError, SandboxService};
use tracing::{debug, info};

use crate::config::AppConfig;

const EXIT_FAILED: u8 = 1;
const EXIT_UNSUPPORTED: u8 = 2;

pub struct RunArgs {
    pub file: PathBuf,
    pub language: String,
    pub tests: Option<String>,
    pub timeout_ms: Option<u64>,
    pub evaluate: bool,
}

/// Execute one file and print the `ExecutionResult` JSON on stdout.
pub async fn execute_run(mut config: AppConfig, args: RunArgs) -> Result<ExitCode> {
    let code = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let mut submission = Submission::new(&args.language, code);
    if let Some(tests) = &args.tests {
        submission.test_cases = parse_test_cases(tests)?;
    }

    if let Some(ms) = args.timeout_ms {
        config.sandbox.limits.execution_timeout = Duration::from_millis(ms);
    }
    if args.evaluate {
        config.evaluator.enabled = true;
    }

    let service = SandboxService::new(&config.sandbox)
        .with_evaluator(proctor_eval::sandbox_evaluator(&config.evaluator))
        .with_evaluation_timeout(config.evaluator.timeout);
    info!(
        file = %args.file.display(),
        language = %args.language,
        "Submitting"
    );

    match service.execute(submission).await {
        Ok(result) => {
            if !result.success {
                info!(
                    failed_tests = result.failed_test_count(),
                    phase = ?result.phase,
                    "Submission failed"
                );
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_FAILED)
            })
        }
        Err(e @ SandboxError::UnsupportedLanguage(_)) => {
            eprintln!("Error: {}", e);
            Ok(ExitCode::from(EXIT_UNSUPPORTED))
        }
        Err(e) => Err(e.into()),
    }
}

/// Inline JSON array, or a path to a file containing one.
pub fn parse_test_cases(value: &str) -> Result<Vec<TestCase>> {
    let path = Path::new(value);
    let json = if !value.trim_start().starts_with('[') && path.is_file() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read test cases from {}", path.display()))?
    } else {
        value.to_string()
    };
    serde_json::from_str(&json).context("Test cases must be a JSON array of {input, expectedOutput}")
}

pub fn execute_languages(config: &SandboxConfig) -> Result<ExitCode> {
    let registry = LanguageRegistry::new(&config.toolchains, &config.heuristics);
    for (language, kind) in registry.languages() {
        println!("{:<12} {}", language.id(), kind);
    }
    Ok(ExitCode::SUCCESS)
}

/// Probe every configured toolchain with `--version`.
pub async fn execute_doctor(config: &SandboxConfig) -> Result<ExitCode> {
    let runner = ProcessRunner::new(config.limits.max_output_bytes);
    let cwd = std::env::temp_dir();
    let mut missing = 0;

    for (name, command) in config.toolchains.entries() {
        debug!(toolchain = name, program = %command.program, "Probing toolchain");
        match runner
            .run_command(
                &command.program,
                &["--version"],
                &cwd,
                Some(config.limits.command_timeout),
            )
            .await
        {
            Ok(stdout) => {
                let version = stdout.lines().next().unwrap_or("").trim();
                println!("{:<12} ok       {} ({})", name, command.program, version);
            }
            Err(e) => {
                missing += 1;
                println!("{:<12} missing  {}: {}", name, command.program, e);
            }
        }
    }

    if missing == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{} toolchain(s) unavailable", missing);
        Ok(ExitCode::from(EXIT_FAILED))
    }
}

pub fn execute_config(config: &AppConfig) -> Result<ExitCode> {
    print!("{}", config.to_toml_string()?);
    Ok(ExitCode::SUCCESS)
}
