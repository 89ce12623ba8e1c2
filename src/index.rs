//! Index assembly.
//!
//! `IndexBuilder` owns the only mutable state of a run: the
//! `rules[ruleKey][language]` map. Entries are folded in one at a time and
//! the document is serialized once by `finalize`. Ordering comes from the
//! `BTreeMap`s, so insertion order never shows in the output.

use crate::error::{ExportError, Result};
use crate::models::index::{IndexDocument, IndexEntry, Link, RulesByKey};
use crate::models::rule::Rule;
use crate::utils;
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Language of the extracted search terms.
pub const TERMS_LANG: &str = "en";

pub struct IndexBuilder {
    target_dir: PathBuf,
    base_dir: PathBuf,
    rules: RulesByKey,
}

impl IndexBuilder {
    /// Links are made relative to the directory of `index_path`, or to
    /// `target_dir` when no index is written.
    pub fn new(target_dir: &Path, index_path: Option<&Path>) -> Self {
        let base_dir = index_path
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| target_dir.to_path_buf());
        IndexBuilder {
            target_dir: target_dir.to_path_buf(),
            base_dir,
            rules: BTreeMap::new(),
        }
    }

    /// Add one rule. A repeated (key, language) pair replaces the earlier entry.
    pub fn accumulate(&mut self, rule: &Rule, metadata: &Map<String, Json>, terms: String) {
        let html_href = relative_href(&self.base_dir, &rule.html_target_path(&self.target_dir));
        let metadata_href =
            relative_href(&self.base_dir, &rule.metadata_target_path(&self.target_dir));
        let title = metadata
            .get("title")
            .and_then(Json::as_str)
            .map(str::to_string);
        let default_severity = metadata.get("defaultSeverity").cloned();
        let severity = default_severity
            .as_ref()
            .and_then(Json::as_str)
            .map(str::to_uppercase);

        let entry = IndexEntry {
            key: rule.key.to_string(),
            language: rule.language.clone(),
            links: vec![
                Link {
                    rel: "description".into(),
                    href: html_href.clone(),
                    title,
                    hreflang: Some(TERMS_LANG.into()),
                },
                Link {
                    rel: "metadata".into(),
                    href: metadata_href,
                    title: None,
                    hreflang: None,
                },
            ],
            html_description: html_href,
            rule_type: metadata.get("type").cloned(),
            status: metadata.get("status").cloned(),
            tags: metadata.get("tags").cloned(),
            default_severity,
            severity,
            terms: BTreeMap::from([(TERMS_LANG.to_string(), terms)]),
        };
        let previous = self
            .rules
            .entry(rule.key.clone())
            .or_default()
            .insert(rule.language.clone(), entry);
        if previous.is_some() {
            debug!(key = %rule.key, language = %rule.language, "index entry replaced");
        }
    }

    /// Number of (key, language) entries.
    pub fn len(&self) -> usize {
        self.rules.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Build the document and, when `output` is set, write it as pretty JSON.
    pub fn finalize(
        self,
        specification: BTreeMap<String, String>,
        output: Option<&Path>,
    ) -> Result<IndexDocument> {
        let entries = self.len();
        let doc = IndexDocument {
            specification,
            rules: self.rules,
        };
        let Some(path) = output else {
            debug!("index output disabled");
            return Ok(doc);
        };
        let index_err = |source: std::io::Error| ExportError::IndexWrite {
            path: path.to_path_buf(),
            source,
        };
        let body = utils::to_pretty_json(&doc).map_err(|e| index_err(e.into()))?;
        if let Some(parent) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(index_err)?;
        }
        fs::write(path, body).map_err(index_err)?;
        info!(path = %path.display(), rules = doc.rules.len(), entries, "index written");
        Ok(doc)
    }
}

/// `target` relative to `base`, rendered with `/`.
///
/// Both sides are made absolute against the working directory and cleared
/// of `.`/`..` first, so a base such as `./../meta` still yields a link that
/// resolves from the index directory.
fn relative_href(base: &Path, target: &Path) -> String {
    let absolute = |p: &Path| {
        let p = if p.as_os_str().is_empty() { Path::new(".") } else { p };
        std::path::absolute(p)
            .map(|a| utils::normalize_lexically(&a))
            .unwrap_or_else(|_| utils::normalize_lexically(p))
    };
    let (base, target) = (absolute(base), absolute(target));
    match pathdiff::diff_paths(&target, &base) {
        Some(diff) => utils::to_slash(&diff),
        // only when the two sides share no root; keep the absolute target
        None => utils::to_slash(&target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rule_id::RuleId;
    use serde_json::json;
    use tempfile::tempdir;

    fn rule(key: &str, language: &str) -> Rule {
        let src = PathBuf::from("src").join(key);
        Rule {
            key: RuleId::new(key).unwrap(),
            language: language.into(),
            html_description: src.join(language).join(format!("{key}.html")),
            metadata: src.join(format!("{key}.json")),
            specific_metadata: src.join(language).join(format!("{key}.json")),
        }
    }

    fn metadata() -> Map<String, Json> {
        match json!({
            "title": "Avoid SQL in loops",
            "type": "CODE_SMELL",
            "status": "ready",
            "tags": ["creedengo", "sql"],
            "defaultSeverity": "Minor"
        }) {
            Json::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_entry_shape_and_relative_links() {
        let target = PathBuf::from("build/site");
        let index = target.join("index.json");
        let mut b = IndexBuilder::new(&target, Some(&index));
        b.accumulate(&rule("GCI1", "java"), &metadata(), "loop query".into());
        let doc = b.finalize(BTreeMap::new(), None).unwrap();

        let entry = &doc.rules[&RuleId::new("GCI1").unwrap()]["java"];
        assert_eq!(entry.key, "GCI1");
        assert_eq!(entry.html_description, "java/GCI1.html");
        let desc = &entry.links[0];
        assert_eq!(desc.rel, "description");
        assert_eq!(desc.href, "java/GCI1.html");
        assert_eq!(desc.title.as_deref(), Some("Avoid SQL in loops"));
        assert_eq!(desc.hreflang.as_deref(), Some("en"));
        assert_eq!(entry.links[1].rel, "metadata");
        assert_eq!(entry.links[1].href, "java/GCI1.json");
        assert_eq!(entry.severity.as_deref(), Some("MINOR"));
        assert_eq!(entry.default_severity, Some(json!("Minor")));
        assert_eq!(entry.terms["en"], "loop query");

        let v = serde_json::to_value(entry).unwrap();
        assert_eq!(v["type"], "CODE_SMELL");
        assert_eq!(v["defaultSeverity"], "Minor");
        assert_eq!(v["htmlDescription"], "java/GCI1.html");
    }

    #[test]
    fn test_links_relative_to_index_elsewhere() {
        let mut b = IndexBuilder::new(Path::new("out/site"), Some(Path::new("out/meta/index.json")));
        b.accumulate(&rule("GCI2", "python"), &metadata(), String::new());
        let doc = b.finalize(BTreeMap::new(), None).unwrap();
        let entry = &doc.rules[&RuleId::new("GCI2").unwrap()]["python"];
        assert_eq!(entry.html_description, "../site/python/GCI2.html");
    }

    #[test]
    fn test_links_follow_index_path_with_parent_segments() {
        // index one level above the working directory
        let mut b = IndexBuilder::new(Path::new("./site"), Some(Path::new("./../meta/index.json")));
        b.accumulate(&rule("GCI1", "java"), &metadata(), String::new());
        let doc = b.finalize(BTreeMap::new(), None).unwrap();
        let entry = &doc.rules[&RuleId::new("GCI1").unwrap()]["java"];

        let cwd = std::env::current_dir().unwrap();
        let here = cwd.file_name().unwrap().to_string_lossy();
        assert_eq!(entry.html_description, format!("../{here}/site/java/GCI1.html"));
        assert_eq!(entry.links[0].href, entry.html_description);
        assert_eq!(entry.links[1].href, format!("../{here}/site/java/GCI1.json"));
    }

    #[test]
    fn test_links_with_absolute_paths_and_dot_dot() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("out/site");
        let index = tmp.path().join("out/site/../meta/./index.json");
        let mut b = IndexBuilder::new(&target, Some(&index));
        b.accumulate(&rule("GCI8", "go"), &metadata(), String::new());
        let doc = b.finalize(BTreeMap::new(), None).unwrap();
        let entry = &doc.rules[&RuleId::new("GCI8").unwrap()]["go"];
        assert_eq!(entry.html_description, "../site/go/GCI8.html");
    }

    #[test]
    fn test_index_in_working_directory() {
        let mut b = IndexBuilder::new(Path::new("site"), Some(Path::new("index.json")));
        b.accumulate(&rule("GCI9", "java"), &metadata(), String::new());
        let doc = b.finalize(BTreeMap::new(), None).unwrap();
        assert_eq!(
            doc.rules[&RuleId::new("GCI9").unwrap()]["java"].html_description,
            "site/java/GCI9.html"
        );
    }

    #[test]
    fn test_missing_metadata_fields_are_omitted() {
        let mut b = IndexBuilder::new(Path::new("t"), None);
        b.accumulate(&rule("GCI3", "go"), &Map::new(), "term".into());
        let doc = b.finalize(BTreeMap::new(), None).unwrap();
        let v = serde_json::to_value(&doc.rules[&RuleId::new("GCI3").unwrap()]["go"]).unwrap();
        let obj = v.as_object().unwrap();
        for k in ["type", "status", "tags", "defaultSeverity", "severity"] {
            assert!(!obj.contains_key(k), "{k} should be omitted");
        }
        assert_eq!(v["links"][0]["href"], "go/GCI3.html");
    }

    #[test]
    fn test_last_write_wins_and_len() {
        let mut b = IndexBuilder::new(Path::new("t"), None);
        assert!(b.is_empty());
        b.accumulate(&rule("GCI4", "java"), &metadata(), "first".into());
        b.accumulate(&rule("GCI4", "java"), &metadata(), "second".into());
        b.accumulate(&rule("GCI4", "kotlin"), &metadata(), "third".into());
        assert_eq!(b.len(), 2);
        let doc = b.finalize(BTreeMap::new(), None).unwrap();
        assert_eq!(doc.rules[&RuleId::new("GCI4").unwrap()]["java"].terms["en"], "second");
    }

    #[test]
    fn test_finalize_writes_sorted_document() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("site");
        let index = target.join("index.json");
        let mut b = IndexBuilder::new(&target, Some(&index));
        for (key, lang) in [("GCI10", "java"), ("GCI9", "python"), ("GCI9", "java"), ("GCI1", "js")] {
            b.accumulate(&rule(key, lang), &metadata(), "term".into());
        }
        let spec = BTreeMap::from([
            ("version".to_string(), "1.2.0".to_string()),
            ("title".to_string(), "Rules".to_string()),
        ]);
        b.finalize(spec, Some(&index)).unwrap();

        let raw = fs::read_to_string(&index).unwrap();
        let pos = |needle: &str| raw.find(needle).unwrap();
        assert!(pos("\"GCI1\"") < pos("\"GCI9\""));
        assert!(pos("\"GCI9\"") < pos("\"GCI10\""));
        assert!(pos("\"title\": \"Rules\"") < pos("\"version\""));
        let doc: IndexDocument = serde_json::from_str(&raw).unwrap();
        let langs: Vec<_> = doc.rules[&RuleId::new("GCI9").unwrap()].keys().cloned().collect();
        assert_eq!(langs, vec!["java", "python"]);
        assert_eq!(doc.specification["version"], "1.2.0");
    }

    #[test]
    fn test_finalize_without_output_writes_nothing() {
        let tmp = tempdir().unwrap();
        let mut b = IndexBuilder::new(tmp.path(), None);
        b.accumulate(&rule("GCI5", "java"), &metadata(), "term".into());
        let doc = b.finalize(BTreeMap::new(), None).unwrap();
        assert_eq!(doc.rules.len(), 1);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_finalize_reports_index_write_error() {
        let tmp = tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let index = blocker.join("index.json");
        let b = IndexBuilder::new(tmp.path(), Some(&index));
        let err = b.finalize(BTreeMap::new(), Some(&index)).unwrap_err();
        assert!(matches!(err, ExportError::IndexWrite { ref path, .. } if path == &index));
    }
}
