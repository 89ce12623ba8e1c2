//! A rule documentation unit for one implementation language.

use super::rule_id::RuleId;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One discovered (rule key, language) pair and its source files.
pub struct Rule {
    pub key: RuleId,
    pub language: String,
    pub html_description: PathBuf,
    /// Base metadata, `<ruleKey>/<ruleKey>.json`.
    pub metadata: PathBuf,
    /// Optional per-language override next to the HTML file.
    pub specific_metadata: PathBuf,
}

impl Rule {
    pub fn html_target_path(&self, target_dir: &Path) -> PathBuf {
        target_dir
            .join(&self.language)
            .join(format!("{}.html", self.key))
    }

    pub fn metadata_target_path(&self, target_dir: &Path) -> PathBuf {
        target_dir
            .join(&self.language)
            .join(format!("{}.json", self.key))
    }

    /// Whether a language-specific override exists on disk.
    pub fn has_specific_metadata(&self) -> bool {
        self.specific_metadata.is_file()
    }
}
