//! Supported languages and the strategy family each one uses

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SandboxError;

/// Execution strategy family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Single interpreter invocation on one source file
    Interpreted,
    /// Translate first, then run the artifact
    Compiled,
    /// Pattern-based validation, nothing is executed
    FrameworkHeuristic,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StrategyKind::Interpreted => "interpreted",
            StrategyKind::Compiled => "compiled",
            StrategyKind::FrameworkHeuristic => "framework-heuristic",
        })
    }
}

/// Language identifiers accepted by the sandbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Java,
    Cpp,
    Jsx,
    Tsx,
    Vue,
    Angular,
    Svelte,
    Html,
    Css,
    Scss,
}

impl Language {
    pub const ALL: [Language; 13] = [
        Language::JavaScript,
        Language::TypeScript,
        Language::Python,
        Language::Java,
        Language::Cpp,
        Language::Jsx,
        Language::Tsx,
        Language::Vue,
        Language::Angular,
        Language::Svelte,
        Language::Html,
        Language::Css,
        Language::Scss,
    ];

    /// Wire identifier
    pub fn id(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::Jsx => "jsx",
            Language::Tsx => "tsx",
            Language::Vue => "vue",
            Language::Angular => "angular",
            Language::Svelte => "svelte",
            Language::Html => "html",
            Language::Css => "css",
            Language::Scss => "scss",
        }
    }

    /// Strategy family for this language
    pub fn strategy_kind(self) -> StrategyKind {
        match self {
            Language::JavaScript | Language::TypeScript | Language::Python => {
                StrategyKind::Interpreted
            }
            Language::Java | Language::Cpp => StrategyKind::Compiled,
            Language::Jsx
            | Language::Tsx
            | Language::Vue
            | Language::Angular
            | Language::Svelte
            | Language::Html
            | Language::Css
            | Language::Scss => StrategyKind::FrameworkHeuristic,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Language {
    type Err = SandboxError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|language| language.id() == normalized)
            .ok_or_else(|| SandboxError::UnsupportedLanguage(s.trim().to_string()))
    }
}
