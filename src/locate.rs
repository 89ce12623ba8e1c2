//! Rule discovery over a source tree.
//!
//! A rule description lives at `<prefix>/<ruleKey>/<language>/<...>.html`.
//! Its base metadata is `<ruleKey>/<ruleKey>.json` and an optional
//! language override sits next to the HTML file under the same name.
//! Files that do not fit this layout are skipped without error.

use crate::error::{ExportError, Result};
use crate::models::rule::Rule;
use crate::models::rule_id::RuleId;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Match a file path against the rule layout without touching the disk.
///
/// `\` and `/` are treated alike. When several segments could be the rule
/// key, the right-most one wins.
pub fn classify(path: &Path) -> Option<Rule> {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let segs: Vec<&str> = normalized.split('/').collect();
    let n = segs.len();
    // prefix, key, language, file at minimum
    if n < 4 || !segs[n - 1].ends_with(".html") {
        return None;
    }
    for i in (1..=n - 3).rev() {
        let language = segs[i + 1];
        if language.is_empty() {
            continue;
        }
        let key = match RuleId::new(segs[i]) {
            Ok(k) => k,
            Err(_) => continue,
        };
        let key_dir = PathBuf::from(segs[..=i].join("/"));
        let file_name = format!("{}.json", key);
        let specific_metadata = path
            .parent()
            .map(|p| p.join(&file_name))
            .unwrap_or_else(|| PathBuf::from(&file_name));
        return Some(Rule {
            metadata: key_dir.join(&file_name),
            specific_metadata,
            language: language.to_string(),
            html_description: path.to_path_buf(),
            key,
        });
    }
    None
}

/// Walk `source_root` and return every complete rule, sorted by key,
/// language, then HTML path.
///
/// A candidate is kept only when its HTML and base metadata are regular
/// files. `key_prefix` restricts discovery to keys with that letter prefix.
/// Any traversal error fails the whole discovery.
pub fn locate(source_root: &Path, key_prefix: Option<&str>) -> Result<Vec<Rule>> {
    let mut rules = Vec::new();
    for entry in WalkDir::new(source_root) {
        let entry = entry.map_err(|source| ExportError::Discovery {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| source_root.to_path_buf()),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(rule) = classify(path) else {
            continue;
        };
        if let Some(prefix) = key_prefix {
            if rule.key.prefix() != prefix {
                debug!(file = %path.display(), key = %rule.key, "rule prefix filtered out");
                continue;
            }
        }
        if !rule.metadata.is_file() {
            debug!(
                file = %path.display(),
                metadata = %rule.metadata.display(),
                "base metadata missing; skipped"
            );
            continue;
        }
        debug!(key = %rule.key, language = %rule.language, "rule discovered");
        rules.push(rule);
    }
    rules.sort_by(|a, b| {
        a.key
            .cmp(&b.key)
            .then_with(|| a.language.cmp(&b.language))
            .then_with(|| a.html_description.cmp(&b.html_description))
    });
    info!(count = rules.len(), root = %source_root.display(), "discovery finished");
    Ok(rules)
}
