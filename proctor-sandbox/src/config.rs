//! Sandbox configuration
//!
//! Loaded from TOML (explicit path, or `$PROCTOR_CONFIG`), falling back to
//! defaults, then patched by `PROCTOR_WORKSPACE_ROOT` and
//! `PROCTOR_MAX_CONCURRENCY`.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::limits::ExecutionLimits;

pub const CONFIG_ENV: &str = "PROCTOR_CONFIG";
pub const WORKSPACE_ROOT_ENV: &str = "PROCTOR_WORKSPACE_ROOT";
pub const MAX_CONCURRENCY_ENV: &str = "PROCTOR_MAX_CONCURRENCY";

/// Top-level sandbox configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Directory under which per-submission workspaces are created
    #[serde(default = "SandboxConfig::default_workspace_root")]
    pub workspace_root: PathBuf,

    /// Upper bound on submissions executing at the same time
    #[serde(default = "SandboxConfig::default_max_concurrent")]
    pub max_concurrent_executions: usize,

    #[serde(default)]
    pub limits: ExecutionLimits,

    #[serde(default)]
    pub toolchains: ToolchainConfig,

    #[serde(default)]
    pub heuristics: HeuristicConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            workspace_root: Self::default_workspace_root(),
            max_concurrent_executions: Self::default_max_concurrent(),
            limits: ExecutionLimits::default(),
            toolchains: ToolchainConfig::default(),
            heuristics: HeuristicConfig::default(),
        }
    }
}

impl SandboxConfig {
    fn default_workspace_root() -> PathBuf {
        std::env::temp_dir().join("proctor-workspaces")
    }

    fn default_max_concurrent() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }

    /// The file to read: `path` if given, else `$PROCTOR_CONFIG`.
    pub fn resolve_path(path: Option<&Path>) -> Option<PathBuf> {
        path.map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
    }

    /// Load from `path`, else `$PROCTOR_CONFIG`, else defaults; env overrides last.
    ///
    /// Tables this crate does not know about (such as `[evaluator]`) are ignored.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match Self::resolve_path(path) {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_toml_str(&content)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Some(root) = std::env::var_os(WORKSPACE_ROOT_ENV) {
            self.workspace_root = PathBuf::from(root);
        }
        if let Ok(value) = std::env::var(MAX_CONCURRENCY_ENV) {
            self.max_concurrent_executions = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {}", MAX_CONCURRENCY_ENV, value))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_concurrent_executions == 0 {
            bail!("max_concurrent_executions must be at least 1");
        }
        if self.limits.execution_timeout.is_zero() || self.limits.compile_timeout.is_zero() {
            bail!("execution and compile timeouts must be non-zero");
        }
        if self.heuristics.delay_min > self.heuristics.delay_max {
            bail!(
                "heuristics.delay_min ({:?}) exceeds heuristics.delay_max ({:?})",
                self.heuristics.delay_min,
                self.heuristics.delay_max
            );
        }
        Ok(())
    }
}

/// Program plus leading arguments for one toolchain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// External programs used by interpreted and compiled strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolchainConfig {
    #[serde(default = "ToolchainConfig::default_node")]
    pub node: CommandSpec,
    #[serde(default = "ToolchainConfig::default_python")]
    pub python: CommandSpec,
    /// Transpile-and-run tool for TypeScript
    #[serde(default = "ToolchainConfig::default_typescript")]
    pub typescript: CommandSpec,
    #[serde(default = "ToolchainConfig::default_javac")]
    pub javac: CommandSpec,
    #[serde(default = "ToolchainConfig::default_java")]
    pub java: CommandSpec,
    #[serde(default = "ToolchainConfig::default_cpp")]
    pub cpp: CommandSpec,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            node: Self::default_node(),
            python: Self::default_python(),
            typescript: Self::default_typescript(),
            javac: Self::default_javac(),
            java: Self::default_java(),
            cpp: Self::default_cpp(),
        }
    }
}

impl ToolchainConfig {
    fn default_node() -> CommandSpec {
        CommandSpec::new("node")
    }

    fn default_python() -> CommandSpec {
        CommandSpec::new("python3")
    }

    fn default_typescript() -> CommandSpec {
        CommandSpec::new("npx").with_args(["--yes", "tsx"])
    }

    fn default_javac() -> CommandSpec {
        CommandSpec::new("javac").with_args(["-encoding", "UTF-8"])
    }

    fn default_java() -> CommandSpec {
        CommandSpec::new("java").with_args(["-Xss8m"])
    }

    fn default_cpp() -> CommandSpec {
        CommandSpec::new("g++").with_args(["-O2", "-std=c++17"])
    }

    /// `(name, spec)` for every configured program.
    pub fn entries(&self) -> [(&'static str, &CommandSpec); 6] {
        [
            ("node", &self.node),
            ("python", &self.python),
            ("typescript", &self.typescript),
            ("javac", &self.javac),
            ("java", &self.java),
            ("cpp", &self.cpp),
        ]
    }
}

/// Synthetic latency for framework heuristics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicConfig {
    #[serde(default = "HeuristicConfig::default_delay_min", with = "humantime_serde")]
    pub delay_min: Duration,
    #[serde(default = "HeuristicConfig::default_delay_max", with = "humantime_serde")]
    pub delay_max: Duration,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            delay_min: Self::default_delay_min(),
            delay_max: Self::default_delay_max(),
        }
    }
}

impl HeuristicConfig {
    fn default_delay_min() -> Duration {
        Duration::from_millis(500)
    }

    fn default_delay_max() -> Duration {
        Duration::from_millis(1000)
    }

    /// No delay at all
    pub fn immediate() -> Self {
        Self {
            delay_min: Duration::ZERO,
            delay_max: Duration::ZERO,
        }
    }
}
