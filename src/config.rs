//! Configuration discovery and effective settings resolution.
//!
//! Rulecat reads `rulecat.toml|yaml|yml` from the repository root (or the
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config.
//! Defaults:
//! - `index`: `<target>/index.json`
//! - `min_term_length`: 4
//! - `on_error`: `abort`
//! - `output`: `human`
//! - `log`: `warn`
//!
//! Overrides precedence: CLI > config file > defaults. Relative paths are
//! resolved against the repository root.

use crate::export::{ErrorPolicy, ExportConfig, IndexOutput};
use crate::terms::DEFAULT_MIN_TERM_LENGTH;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILES: [&str; 3] = ["rulecat.toml", "rulecat.yaml", "rulecat.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `rulecat.toml|yaml`.
pub struct RulecatConfig {
    pub source: Option<String>,
    pub target: Option<String>,
    pub index: Option<String>,
    /// `false` disables the index document.
    pub write_index: Option<bool>,
    pub min_term_length: Option<usize>,
    pub key_prefix: Option<String>,
    pub on_error: Option<ErrorPolicy>,
    pub output: Option<String>,
    pub log: Option<String>,
    #[serde(default)]
    pub specification: BTreeMap<String, String>, // [specification] title/version/scmRevisionNumber/scmRevisionDate
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid TOML", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{} is not valid YAML", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Default, Clone)]
/// Values supplied on the command line. `None` defers to the config file.
pub struct Overrides {
    pub repo_root: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub index: Option<String>,
    pub no_index: bool,
    pub min_term_length: Option<usize>,
    pub key_prefix: Option<String>,
    pub on_error: Option<ErrorPolicy>,
    pub output: Option<String>,
    pub log: Option<String>,
    pub specification: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_file: Option<PathBuf>,
    pub source: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub index: IndexOutput,
    pub min_term_length: usize,
    pub key_prefix: Option<String>,
    pub on_error: ErrorPolicy,
    pub output: String,
    pub log: String,
    pub specification: BTreeMap<String, String>,
}

impl Effective {
    pub fn export_config(&self) -> ExportConfig {
        ExportConfig {
            specification: self.specification.clone(),
            index: self.index.clone(),
            min_term_length: self.min_term_length,
            key_prefix: self.key_prefix.clone(),
            on_error: self.on_error,
        }
    }
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `rulecat.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `RulecatConfig` from the first config file present in `root`.
pub fn load_config(root: &Path) -> Result<Option<(PathBuf, RulecatConfig)>, ConfigError> {
    for name in CONFIG_FILES {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let cfg = if name.ends_with(".toml") {
            toml::from_str(&s).map_err(|source| ConfigError::Toml {
                path: path.clone(),
                source,
            })?
        } else {
            serde_yaml::from_str(&s).map_err(|source| ConfigError::Yaml {
                path: path.clone(),
                source,
            })?
        };
        return Ok(Some((path, cfg)));
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: Overrides) -> Result<Effective, ConfigError> {
    let start = PathBuf::from(cli.repo_root.as_deref().unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let (config_file, cfg) = match load_config(&repo_root)? {
        Some((path, cfg)) => (Some(path), cfg),
        None => (None, RulecatConfig::default()),
    };
    let at_root = |p: String| repo_root.join(p);

    let source = cli.source.or(cfg.source).map(at_root);
    let target = cli.target.or(cfg.target).map(at_root);

    let index = if cli.no_index {
        IndexOutput::Disabled
    } else if let Some(p) = cli.index {
        IndexOutput::At(at_root(p))
    } else if cfg.write_index == Some(false) {
        IndexOutput::Disabled
    } else if let Some(p) = cfg.index {
        IndexOutput::At(at_root(p))
    } else {
        IndexOutput::Default
    };

    let min_term_length = cli
        .min_term_length
        .or(cfg.min_term_length)
        .unwrap_or(DEFAULT_MIN_TERM_LENGTH);
    let key_prefix = cli
        .key_prefix
        .or(cfg.key_prefix)
        .filter(|p| !p.trim().is_empty());
    let on_error = cli.on_error.or(cfg.on_error).unwrap_or_default();
    let output = cli
        .output
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    let log = cli.log.or(cfg.log).unwrap_or_else(|| "warn".to_string());

    // CLI fields win key by key over [specification]
    let mut specification = cfg.specification;
    specification.extend(cli.specification);

    Ok(Effective {
        repo_root,
        config_file,
        source,
        target,
        index,
        min_term_length,
        key_prefix,
        on_error,
        output,
        log,
        specification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn at(root: &Path) -> Overrides {
        Overrides {
            repo_root: root.to_str().map(String::from),
            ..Overrides::default()
        }
    }

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("rulecat.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
source = "rules"
target = "build/site"
min_term_length = 3
key_prefix = "GCI"
on_error = "skip"
output = "json"
[specification]
title = "Creedengo"
version = "2.1.0"
scmRevisionNumber = "abc123"
    "#
        )
        .unwrap();

        // Resolve using explicit repo_root to avoid global CWD races
        let eff = resolve_effective(at(root)).unwrap();
        assert_eq!(eff.source, Some(root.join("rules")));
        assert_eq!(eff.target, Some(root.join("build/site")));
        assert_eq!(eff.index, IndexOutput::Default);
        assert_eq!(eff.min_term_length, 3);
        assert_eq!(eff.key_prefix.as_deref(), Some("GCI"));
        assert_eq!(eff.on_error, ErrorPolicy::Skip);
        assert_eq!(eff.output, "json");
        assert_eq!(eff.specification["scmRevisionNumber"], "abc123");
        assert_eq!(eff.config_file, Some(root.join("rulecat.toml")));
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("rulecat.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
source: src/main/rules
target: out
write_index: false
            "#
        )
        .unwrap();

        let eff = resolve_effective(at(root)).unwrap();
        assert_eq!(eff.source, Some(root.join("src/main/rules")));
        assert_eq!(eff.index, IndexOutput::Disabled);
        assert_eq!(eff.min_term_length, 4);
        assert_eq!(eff.on_error, ErrorPolicy::Abort);
        assert_eq!(eff.output, "human");
        assert_eq!(eff.log, "warn");
        assert!(eff.specification.is_empty());
    }

    #[test]
    fn test_cli_takes_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("rulecat.toml"),
            r#"
source = "rules"
target = "site"
index = "site/meta/index.json"
min_term_length = 5
[specification]
title = "From config"
version = "1.0.0"
"#,
        )
        .unwrap();

        let mut cli = at(root);
        cli.target = Some("other".into());
        cli.min_term_length = Some(2);
        cli.specification.insert("version".into(), "9.9.9".into());
        let eff = resolve_effective(cli).unwrap();
        assert_eq!(eff.target, Some(root.join("other")));
        assert_eq!(eff.index, IndexOutput::At(root.join("site/meta/index.json")));
        assert_eq!(eff.min_term_length, 2);
        assert_eq!(eff.specification["title"], "From config");
        assert_eq!(eff.specification["version"], "9.9.9");

        let mut cli = at(root);
        cli.no_index = true;
        assert_eq!(resolve_effective(cli).unwrap().index, IndexOutput::Disabled);
    }

    #[test]
    fn test_no_config_uses_defaults() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let eff = resolve_effective(at(dir.path())).unwrap();
        assert!(eff.config_file.is_none());
        assert!(eff.source.is_none());
        assert!(eff.target.is_none());
        let cfg = eff.export_config();
        assert_eq!(cfg.min_term_length, 4);
        assert_eq!(cfg.index, IndexOutput::Default);
    }

    #[test]
    fn test_config_found_in_ancestor() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("rulecat.toml"), "source = \"rules\"\n").unwrap();
        let nested = root.join("a/b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(detect_repo_root(&nested), root.to_path_buf());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("rulecat.toml"), "source = [unclosed").unwrap();
        let err = resolve_effective(at(dir.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }
}
