use async_trait::async_trait;
use proctor_common::ExecutionPhase;

use super::{run_program, workspace_failure, ExecutionStrategy, StrategyContext};
use crate::config::CommandSpec;
use crate::language::Language;
use crate::runtime::ProcessSpec;
use crate::types::StrategyOutcome;

/// Writes one source file and hands it to an interpreter.
///
/// TypeScript goes through a transpile-and-run tool, so it is interpreted
/// from the sandbox's point of view: nothing is left behind to execute.
#[derive(Debug, Clone)]
pub struct InterpretedStrategy {
    language: Language,
    command: CommandSpec,
    source_file: &'static str,
}

impl InterpretedStrategy {
    pub fn javascript(command: CommandSpec) -> Self {
        Self {
            language: Language::JavaScript,
            command,
            source_file: "main.js",
        }
    }

    pub fn python(command: CommandSpec) -> Self {
        Self {
            language: Language::Python,
            command,
            source_file: "main.py",
        }
    }

    pub fn typescript(command: CommandSpec) -> Self {
        Self {
            language: Language::TypeScript,
            command,
            source_file: "main.ts",
        }
    }
}

#[async_trait]
impl ExecutionStrategy for InterpretedStrategy {
    fn language(&self) -> Language {
        self.language
    }

    async fn execute(&self, mut ctx: StrategyContext<'_>) -> StrategyOutcome {
        if let Err(e) = ctx
            .workspace
            .write_file(self.source_file, &ctx.submission.code)
            .await
        {
            return workspace_failure(ExecutionPhase::Run, e);
        }

        let template = ProcessSpec::new(&self.command.program, ctx.workspace.path())
            .args(self.command.args.iter().cloned())
            .arg(self.source_file)
            .timeout(ctx.limits.execution_timeout);

        tracing::debug!(
            language = %self.language,
            program = %self.command.program,
            "Running interpreter"
        );
        run_program(&mut ctx, template).await
    }
}
