//! Framework heuristics
//!
//! Component frameworks, markup and stylesheets are not compiled. The source
//! is matched against a table of required, discouraged and idiomatic
//! patterns for its language. This is pattern matching, not a compiler: a
//! passing report is no proof the code builds, and submitted code is never
//! executed. A short random delay keeps the response time in line with the
//! executable languages.

mod rules;

use std::time::Duration;

use async_trait::async_trait;
use proctor_common::ExecutionPhase;
use rand::Rng;

use super::{ExecutionStrategy, StrategyContext};
use crate::config::HeuristicConfig;
use crate::execution::ExecutionStage;
use crate::language::Language;
use crate::types::{FailureKind, StrategyOutcome};
use rules::{Pattern, RuleSet};

/// Result of matching one source text against a rule table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicReport {
    pub framework: &'static str,
    pub missing: Vec<&'static str>,
    pub discouraged: Vec<&'static str>,
    pub idioms_found: Vec<&'static str>,
    pub idioms_absent: Vec<&'static str>,
}

impl HeuristicReport {
    fn analyze(table: &RuleSet, code: &str) -> Self {
        let labels = |patterns: &[Pattern], present: bool| -> Vec<&'static str> {
            patterns
                .iter()
                .filter(|p| p.matcher.matches(code) == present)
                .map(|p| p.label)
                .collect()
        };
        Self {
            framework: table.framework,
            missing: labels(table.required.as_slice(), false),
            discouraged: labels(table.discouraged.as_slice(), true),
            idioms_found: labels(table.idioms.as_slice(), true),
            idioms_absent: labels(table.idioms.as_slice(), false),
        }
    }

    /// Render the success report. Line order follows the rule table.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{} structure check passed (static pattern analysis, code was not executed)\n",
            self.framework
        );
        out.push_str(&format!(
            "Idioms used: {}/{}\n",
            self.idioms_found.len(),
            self.idioms_found.len() + self.idioms_absent.len()
        ));
        for idiom in &self.idioms_found {
            out.push_str(&format!("  [x] {}\n", idiom));
        }
        for idiom in &self.idioms_absent {
            out.push_str(&format!("  [ ] {}\n", idiom));
        }
        out
    }

    fn into_outcome(self) -> StrategyOutcome {
        if !self.missing.is_empty() {
            return StrategyOutcome::failed(
                FailureKind::Validation,
                ExecutionPhase::Validate,
                format!("Missing required patterns: {}", self.missing.join(", ")),
            );
        }
        if !self.discouraged.is_empty() {
            return StrategyOutcome::failed(
                FailureKind::Validation,
                ExecutionPhase::Validate,
                format!(
                    "Warning: discouraged patterns found: {}",
                    self.discouraged.join(", ")
                ),
            );
        }
        StrategyOutcome::succeeded(self.render())
    }
}

/// Pattern-based validation for one framework language
pub struct FrameworkHeuristicStrategy {
    language: Language,
    rules: &'static RuleSet,
    delay: HeuristicConfig,
}

impl FrameworkHeuristicStrategy {
    /// `None` if `language` has no rule table.
    pub fn new(language: Language, delay: HeuristicConfig) -> Option<Self> {
        rules::for_language(language).map(|rules| Self {
            language,
            rules,
            delay,
        })
    }

    pub fn analyze(&self, code: &str) -> HeuristicReport {
        HeuristicReport::analyze(self.rules, code)
    }

    fn pick_delay(&self) -> Duration {
        let min = self.delay.delay_min.as_millis() as u64;
        let max = self.delay.delay_max.as_millis() as u64;
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

#[async_trait]
impl ExecutionStrategy for FrameworkHeuristicStrategy {
    fn language(&self) -> Language {
        self.language
    }

    async fn execute(&self, mut ctx: StrategyContext<'_>) -> StrategyOutcome {
        ctx.enter(ExecutionStage::Executing);

        let delay = self.pick_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if !ctx.submission.test_cases.is_empty() {
            tracing::debug!(language = %self.language, "Test cases ignored for framework heuristic");
        }

        let report = self.analyze(&ctx.submission.code);
        tracing::debug!(
            language = %self.language,
            missing = report.missing.len(),
            discouraged = report.discouraged.len(),
            idioms = report.idioms_found.len(),
            "Heuristic analysis finished"
        );
        report.into_outcome()
    }
}
