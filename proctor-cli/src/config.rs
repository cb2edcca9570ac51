//! Everything `proctor` reads from its config file

use std::path::Path;

use anyhow::{Context, Result};
use proctor_eval::EvaluatorConfig;
use proctor_sandbox::SandboxConfig;
use serde::{Deserialize, Serialize};

/// Sandbox settings plus the `[evaluator]` table of the same file
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub sandbox: SandboxConfig,
    pub evaluator: EvaluatorConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct EvaluatorTable {
    #[serde(default)]
    evaluator: EvaluatorConfig,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let sandbox = SandboxConfig::load(path)?;
        let evaluator = match SandboxConfig::resolve_path(path) {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                parse_evaluator(&content)
                    .with_context(|| format!("Failed to parse [evaluator] in {}", path.display()))?
            }
            None => EvaluatorConfig::default(),
        };
        Ok(Self { sandbox, evaluator })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        let evaluator = toml::to_string_pretty(&EvaluatorTable {
            evaluator: self.evaluator.clone(),
        })
        .context("Failed to serialize evaluator config")?;
        Ok(format!("{}\n{}", self.sandbox.to_toml_string()?, evaluator))
    }
}

fn parse_evaluator(content: &str) -> Result<EvaluatorConfig> {
    let table: EvaluatorTable = toml::from_str(content)?;
    Ok(table.evaluator)
}
