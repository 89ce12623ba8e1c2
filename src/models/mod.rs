//! Shared data models: rule ids, discovered rules, the index document, and
//! the run result printed by the binary.

pub mod index;
pub mod rule;
pub mod rule_id;

use serde::Serialize;

#[derive(Debug, Serialize)]
/// A rule/language pair that was copied (and indexed, when enabled).
pub struct ExportedRule {
    pub key: String,
    pub language: String,
    pub html: String,
    pub metadata: String,
    pub merged: bool,
    pub terms: usize,
}

#[derive(Debug, Serialize)]
/// A rule/language pair left out of the run under the `skip` policy.
pub struct RuleFailure {
    pub key: String,
    pub language: String,
    pub file: String,
    pub message: String,
}

#[derive(Debug, Default, Serialize, PartialEq)]
/// Aggregated counts used by printers.
pub struct Summary {
    pub rules: usize,
    pub languages: usize,
    pub merged: usize,
    pub failures: usize,
}

#[derive(Debug, Serialize)]
/// Outcome of one export run.
pub struct RunResult {
    pub rules: Vec<ExportedRule>,
    pub failures: Vec<RuleFailure>,
    pub index: Option<String>,
    pub summary: Summary,
}
