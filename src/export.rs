//! Export orchestration: discover rules, resolve metadata, copy
//! descriptions, extract terms, and write the index.
//!
//! Per-rule work runs on the rayon pool and returns plain values. The index
//! is filled afterwards by the calling thread in discovery order, so no
//! worker ever touches the accumulator.

use crate::error::{ExportError, Result};
use crate::index::IndexBuilder;
use crate::models::rule::Rule;
use crate::models::{ExportedRule, RuleFailure, RunResult, Summary};
use crate::terms::DEFAULT_MIN_TERM_LENGTH;
use crate::{locate, merge, terms, utils};
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::{Map, Value as Json};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
/// What to do when one rule fails to export.
pub enum ErrorPolicy {
    /// Stop the run and write no index.
    #[default]
    Abort,
    /// Leave the rule out of the index, report it, keep going.
    Skip,
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(ErrorPolicy::Abort),
            "skip" => Ok(ErrorPolicy::Skip),
            other => Err(format!("unknown error policy '{}' (expected abort|skip)", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Where the index document goes.
pub enum IndexOutput {
    /// `<target>/index.json`
    #[default]
    Default,
    At(PathBuf),
    Disabled,
}

impl IndexOutput {
    pub fn resolve(&self, target_dir: &Path) -> Option<PathBuf> {
        match self {
            IndexOutput::Default => Some(target_dir.join("index.json")),
            IndexOutput::At(p) => Some(p.clone()),
            IndexOutput::Disabled => None,
        }
    }
}

#[derive(Debug, Clone)]
/// Inputs of one export run beyond the source and target directories.
pub struct ExportConfig {
    /// Free-form `specification` block copied into the index.
    pub specification: BTreeMap<String, String>,
    pub index: IndexOutput,
    pub min_term_length: usize,
    /// Only export rule keys with this letter prefix.
    pub key_prefix: Option<String>,
    pub on_error: ErrorPolicy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            specification: BTreeMap::new(),
            index: IndexOutput::Default,
            min_term_length: DEFAULT_MIN_TERM_LENGTH,
            key_prefix: None,
            on_error: ErrorPolicy::Abort,
        }
    }
}

struct Processed {
    metadata: Map<String, Json>,
    terms: String,
    merged: bool,
}

/// Export every rule under `source_dir` into `target_dir`.
///
/// Discovery happens before any write, so an unreadable source tree leaves
/// the target untouched. Under `ErrorPolicy::Abort` every rule still runs;
/// the first failure in discovery order is returned and no index is
/// written.
pub fn process_tree(source_dir: &Path, target_dir: &Path, config: &ExportConfig) -> Result<RunResult> {
    let discovered = locate::locate(source_dir, config.key_prefix.as_deref())?;
    let rules = last_per_pair(discovered);
    let index_path = config.index.resolve(target_dir);
    info!(
        rules = rules.len(),
        source = %source_dir.display(),
        target = %target_dir.display(),
        "export started"
    );

    let min_term_length = config.min_term_length;
    let outcomes: Vec<(Rule, Result<Processed>)> = rules
        .into_par_iter()
        .map(|rule| {
            let outcome = process_rule(&rule, target_dir, min_term_length);
            (rule, outcome)
        })
        .collect();

    let mut builder = IndexBuilder::new(target_dir, index_path.as_deref());
    let mut exported = Vec::new();
    let mut failures = Vec::new();
    for (rule, outcome) in outcomes {
        match outcome {
            Ok(p) => {
                exported.push(ExportedRule {
                    key: rule.key.to_string(),
                    language: rule.language.clone(),
                    html: rule.html_target_path(target_dir).to_string_lossy().to_string(),
                    metadata: rule
                        .metadata_target_path(target_dir)
                        .to_string_lossy()
                        .to_string(),
                    merged: p.merged,
                    terms: p.terms.split_whitespace().count(),
                });
                builder.accumulate(&rule, &p.metadata, p.terms);
            }
            Err(err) => match config.on_error {
                ErrorPolicy::Abort => return Err(err),
                ErrorPolicy::Skip => {
                    let message = utils::error_chain(&err);
                    warn!(key = %rule.key, language = %rule.language, error = %message, "rule skipped");
                    failures.push(RuleFailure {
                        key: rule.key.to_string(),
                        language: rule.language.clone(),
                        file: err.path().to_string_lossy().to_string(),
                        message,
                    });
                }
            },
        }
    }

    builder.finalize(config.specification.clone(), index_path.as_deref())?;

    let languages: BTreeSet<&str> = exported.iter().map(|r| r.language.as_str()).collect();
    let summary = Summary {
        rules: exported.len(),
        languages: languages.len(),
        merged: exported.iter().filter(|r| r.merged).count(),
        failures: failures.len(),
    };
    info!(
        rules = summary.rules,
        languages = summary.languages,
        failures = summary.failures,
        "export finished"
    );
    Ok(RunResult {
        rules: exported,
        failures,
        index: index_path.map(|p| p.to_string_lossy().to_string()),
        summary,
    })
}

/// Keep only the last rule of each (key, language) run. Input is sorted, so
/// duplicates are adjacent and the survivor is deterministic.
fn last_per_pair(rules: Vec<Rule>) -> Vec<Rule> {
    let mut out: Vec<Rule> = Vec::with_capacity(rules.len());
    for rule in rules {
        if let Some(last) = out.last_mut() {
            if last.key == rule.key && last.language == rule.language {
                warn!(
                    key = %rule.key,
                    language = %rule.language,
                    dropped = %last.html_description.display(),
                    kept = %rule.html_description.display(),
                    "several descriptions for one rule and language"
                );
                *last = rule;
                continue;
            }
        }
        out.push(rule);
    }
    out
}

/// Metadata, HTML copy and terms for one rule. Touches only this rule's
/// target files.
fn process_rule(rule: &Rule, target_dir: &Path, min_term_length: usize) -> Result<Processed> {
    let merged = rule.has_specific_metadata();
    let metadata = merge::resolve(
        &rule.metadata,
        &rule.specific_metadata,
        &rule.metadata_target_path(target_dir),
    )?;
    let terms = terms::extract_terms(&rule.html_description, min_term_length)?;

    let html_target = rule.html_target_path(target_dir);
    utils::ensure_parent(&html_target)?;
    debug!(from = %rule.html_description.display(), to = %html_target.display(), "copy description");
    fs::copy(&rule.html_description, &html_target).map_err(|source| ExportError::Write {
        path: html_target.clone(),
        source,
    })?;
    Ok(Processed {
        metadata,
        terms,
        merged,
    })
}
