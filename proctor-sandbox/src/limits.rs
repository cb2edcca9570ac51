//! Time and output limits applied to sandboxed execution

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits for one submission's execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLimits {
    /// Wall-clock deadline for the run phase
    #[serde(default = "ExecutionLimits::default_execution_timeout", with = "humantime_serde")]
    pub execution_timeout: Duration,

    /// Wall-clock deadline for the compile phase
    #[serde(default = "ExecutionLimits::default_compile_timeout", with = "humantime_serde")]
    pub compile_timeout: Duration,

    /// Deadline for ad hoc helper commands (toolchain probes)
    #[serde(default = "ExecutionLimits::default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,

    /// Captured bytes kept per output stream
    #[serde(default = "ExecutionLimits::default_max_output_bytes")]
    pub max_output_bytes: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            execution_timeout: Self::default_execution_timeout(),
            compile_timeout: Self::default_compile_timeout(),
            command_timeout: Self::default_command_timeout(),
            max_output_bytes: Self::default_max_output_bytes(),
        }
    }
}

impl ExecutionLimits {
    fn default_execution_timeout() -> Duration {
        Duration::from_secs(10)
    }

    fn default_compile_timeout() -> Duration {
        Duration::from_secs(30)
    }

    fn default_command_timeout() -> Duration {
        Duration::from_secs(5)
    }

    fn default_max_output_bytes() -> usize {
        1024 * 1024
    }

}
