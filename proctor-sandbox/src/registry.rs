//! Language registry
//!
//! Built once at construction time. Adding a language means adding one entry
//! here and a strategy behind it.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{HeuristicConfig, ToolchainConfig};
use crate::error::{Result, SandboxError};
use crate::language::{Language, StrategyKind};
use crate::strategy::{
    CppStrategy, ExecutionStrategy, FrameworkHeuristicStrategy, InterpretedStrategy, JavaStrategy,
};

/// Maps each supported language to its strategy
#[derive(Clone)]
pub struct LanguageRegistry {
    strategies: BTreeMap<Language, Arc<dyn ExecutionStrategy>>,
}

impl LanguageRegistry {
    /// Registry with every built-in language.
    pub fn new(toolchains: &ToolchainConfig, heuristics: &HeuristicConfig) -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(InterpretedStrategy::javascript(toolchains.node.clone())));
        registry.register(Arc::new(InterpretedStrategy::python(toolchains.python.clone())));
        registry.register(Arc::new(InterpretedStrategy::typescript(
            toolchains.typescript.clone(),
        )));
        registry.register(Arc::new(JavaStrategy::new(
            toolchains.javac.clone(),
            toolchains.java.clone(),
        )));
        registry.register(Arc::new(CppStrategy::new(toolchains.cpp.clone())));

        for language in Language::ALL {
            if let Some(strategy) = FrameworkHeuristicStrategy::new(language, heuristics.clone()) {
                registry.register(Arc::new(strategy));
            }
        }
        registry
    }

    pub fn empty() -> Self {
        Self {
            strategies: BTreeMap::new(),
        }
    }

    /// Install `strategy` for its language, replacing any previous entry.
    pub fn register(&mut self, strategy: Arc<dyn ExecutionStrategy>) {
        self.strategies.insert(strategy.language(), strategy);
    }

    /// Resolve a wire identifier (case-insensitive). Performs no I/O.
    pub fn resolve(&self, language_id: &str) -> Result<Arc<dyn ExecutionStrategy>> {
        let language: Language = language_id.parse()?;
        self.get(language)
            .ok_or_else(|| SandboxError::UnsupportedLanguage(language_id.trim().to_string()))
    }

    pub fn get(&self, language: Language) -> Option<Arc<dyn ExecutionStrategy>> {
        self.strategies.get(&language).cloned()
    }

    /// Registered languages in a stable order.
    pub fn languages(&self) -> Vec<(Language, StrategyKind)> {
        self.strategies
            .iter()
            .map(|(language, strategy)| (*language, strategy.kind()))
            .collect()
    }
}

impl std::fmt::Debug for LanguageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageRegistry")
            .field("languages", &self.strategies.keys().collect::<Vec<_>>())
            .finish()
    }
}
