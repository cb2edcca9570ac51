use serde::{Deserialize, Serialize};

/// Score sheet produced by an external evaluator for a successful run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Overall score, 0-100.
    pub score: f64,
    pub feedback: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub code_quality: CodeQuality,
}

/// Per-axis quality ratings, 0-100 each.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CodeQuality {
    pub readability: f64,
    pub efficiency: f64,
    pub correctness: f64,
}

impl CodeQuality {
    /// Iterate over `(axis, value)` pairs.
    pub fn axes(&self) -> [(&'static str, f64); 3] {
        [
            ("readability", self.readability),
            ("efficiency", self.efficiency),
            ("correctness", self.correctness),
        ]
    }
}
