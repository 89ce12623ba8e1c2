//! Supporting helpers: file writes, path rendering, CLI prefixes.

use crate::error::{ExportError, Result};
use owo_colors::OwoColorize;
use std::error::Error as StdError;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Create the parent directory of `p` (recursively, idempotently).
pub fn ensure_parent(p: &Path) -> Result<()> {
    if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ExportError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Write bytes to `p`, creating its parent directory first.
pub fn write_file(p: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    ensure_parent(p)?;
    fs::write(p, contents).map_err(|source| ExportError::Write {
        path: p.to_path_buf(),
        source,
    })
}

/// Pretty-print JSON with a trailing newline.
pub fn to_pretty_json<T: serde::Serialize>(value: &T) -> serde_json::Result<String> {
    let mut s = serde_json::to_string_pretty(value)?;
    s.push('\n');
    Ok(s)
}

/// Render a path with `/` separators regardless of platform. A root or
/// drive prefix is kept, `.` components are dropped.
pub fn to_slash(p: &Path) -> String {
    let mut out = String::new();
    for c in p.components() {
        match c {
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::RootDir => out.push('/'),
            Component::CurDir => {}
            Component::ParentDir | Component::Normal(_) => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&c.as_os_str().to_string_lossy());
            }
        }
    }
    out
}

/// Resolve `.` and `..` without touching the file system. `..` above the
/// root of an absolute path is dropped; leading `..` of a relative path is
/// kept.
pub fn normalize_lexically(p: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in p.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_parent = matches!(out.components().next_back(), Some(Component::ParentDir));
                if at_parent || out.as_os_str().is_empty() {
                    out.push("..");
                } else {
                    out.pop();
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Flatten an error and its sources into `outer: inner: root`.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut cur = err.source();
    while let Some(e) = cur {
        out.push_str(": ");
        out.push_str(&e.to_string());
        cur = e.source();
    }
    out
}

fn colorize() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if colorize() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn note_prefix() -> String {
    if colorize() {
        "note:".blue().bold().to_string()
    } else {
        "note:".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_to_slash_joins_normal_components() {
        let p: PathBuf = ["java", "GCI1.html"].iter().collect();
        assert_eq!(to_slash(&p), "java/GCI1.html");
        let up: PathBuf = ["..", "site", "java", "GCI1.json"].iter().collect();
        assert_eq!(to_slash(&up), "../site/java/GCI1.json");
        assert_eq!(to_slash(Path::new("./java/./GCI1.html")), "java/GCI1.html");
    }

    #[cfg(unix)]
    #[test]
    fn test_to_slash_keeps_root() {
        assert_eq!(to_slash(Path::new("/srv/site/GCI1.html")), "/srv/site/GCI1.html");
        assert_eq!(to_slash(Path::new("/")), "/");
    }

    #[test]
    fn test_normalize_lexically_resolves_dots() {
        assert_eq!(normalize_lexically(Path::new("./a/../meta/./x")), PathBuf::from("meta/x"));
        assert_eq!(normalize_lexically(Path::new("./../meta")), PathBuf::from("../meta"));
        assert_eq!(normalize_lexically(Path::new("../../a/..")), PathBuf::from("../.."));
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_lexically_stops_at_root() {
        assert_eq!(normalize_lexically(Path::new("/../srv/./a/..")), PathBuf::from("/srv"));
    }

    #[test]
    fn test_write_file_creates_parents() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("a/b/c.txt");
        write_file(&p, "x").unwrap();
        write_file(&p, "y").unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), "y");
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let err = ExportError::Write {
            path: PathBuf::from("out/x.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(error_chain(&err), "cannot write out/x.json: denied");
    }
}
