//! Compile-then-run strategies
//!
//! Translation is its own child process with its own deadline. The artifact
//! is only executed when the compiler exits zero.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use proctor_common::ExecutionPhase;
use regex::Regex;

use super::{run_program, workspace_failure, ExecutionStrategy, StrategyContext};
use crate::config::CommandSpec;
use crate::execution::ExecutionStage;
use crate::language::Language;
use crate::runtime::{ProcessSpec, RunError};
use crate::types::{FailureKind, StrategyOutcome};

const DEFAULT_JAVA_CLASS: &str = "Main";

static PUBLIC_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*public\s+(?:(?:final|abstract)\s+)*class\s+([A-Za-z_$][A-Za-z0-9_$]*)")
        .expect("valid regex")
});

/// Name of the first `public class`, which javac requires to match the file name.
pub fn detect_java_class(source: &str) -> &str {
    PUBLIC_CLASS
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(DEFAULT_JAVA_CLASS)
}

/// Run the compiler; `Err` carries the finished failure outcome.
async fn compile(ctx: &mut StrategyContext<'_>, spec: ProcessSpec) -> Result<(), StrategyOutcome> {
    ctx.enter(ExecutionStage::CompilePhase);
    let program = spec.program.clone();

    match ctx.runner.run(spec).await {
        Ok(_) => Ok(()),
        Err(RunError::Timeout { .. }) => Err(StrategyOutcome::failed(
            FailureKind::Timeout,
            ExecutionPhase::Compile,
            "Compilation timeout",
        )),
        Err(err @ RunError::Exited { .. }) => {
            tracing::debug!(program = %program, "Compilation failed");
            Err(StrategyOutcome::failed(
                FailureKind::Compile,
                ExecutionPhase::Compile,
                err.diagnostic_with_stdout_fallback(),
            ))
        }
        Err(err) => Err(StrategyOutcome::failed(
            FailureKind::Runtime,
            ExecutionPhase::Compile,
            err.to_string(),
        )),
    }
}

/// `javac <Class>.java`, then `java -cp . <Class>`
#[derive(Debug, Clone)]
pub struct JavaStrategy {
    javac: CommandSpec,
    java: CommandSpec,
}

impl JavaStrategy {
    pub fn new(javac: CommandSpec, java: CommandSpec) -> Self {
        Self { javac, java }
    }
}

#[async_trait]
impl ExecutionStrategy for JavaStrategy {
    fn language(&self) -> Language {
        Language::Java
    }

    async fn execute(&self, mut ctx: StrategyContext<'_>) -> StrategyOutcome {
        let class_name = detect_java_class(&ctx.submission.code).to_string();
        let source_file = format!("{}.java", class_name);

        if let Err(e) = ctx
            .workspace
            .write_file(&source_file, &ctx.submission.code)
            .await
        {
            return workspace_failure(ExecutionPhase::Compile, e);
        }

        let compile_spec = ProcessSpec::new(&self.javac.program, ctx.workspace.path())
            .args(self.javac.args.iter().cloned())
            .arg(&source_file)
            .timeout(ctx.limits.compile_timeout);
        if let Err(outcome) = compile(&mut ctx, compile_spec).await {
            return outcome;
        }

        let template = ProcessSpec::new(&self.java.program, ctx.workspace.path())
            .args(self.java.args.iter().cloned())
            .args(["-cp", "."])
            .arg(class_name)
            .timeout(ctx.limits.execution_timeout);
        run_program(&mut ctx, template).await
    }
}

/// `g++ -o main main.cpp`, then `./main`
#[derive(Debug, Clone)]
pub struct CppStrategy {
    compiler: CommandSpec,
}

impl CppStrategy {
    pub fn new(compiler: CommandSpec) -> Self {
        Self { compiler }
    }
}

#[async_trait]
impl ExecutionStrategy for CppStrategy {
    fn language(&self) -> Language {
        Language::Cpp
    }

    async fn execute(&self, mut ctx: StrategyContext<'_>) -> StrategyOutcome {
        if let Err(e) = ctx
            .workspace
            .write_file("main.cpp", &ctx.submission.code)
            .await
        {
            return workspace_failure(ExecutionPhase::Compile, e);
        }

        let artifact = format!("main{}", std::env::consts::EXE_SUFFIX);
        let compile_spec = ProcessSpec::new(&self.compiler.program, ctx.workspace.path())
            .args(self.compiler.args.iter().cloned())
            .args(["-o", artifact.as_str(), "main.cpp"])
            .timeout(ctx.limits.compile_timeout);
        if let Err(outcome) = compile(&mut ctx, compile_spec).await {
            return outcome;
        }

        // Absolute path: relative program lookup ignores the child's cwd on some platforms.
        let binary = ctx.workspace.path().join(&artifact);
        let template = ProcessSpec::new(binary.to_string_lossy(), ctx.workspace.path())
            .timeout(ctx.limits.execution_timeout);
        run_program(&mut ctx, template).await
    }
}
