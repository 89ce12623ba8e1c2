//! Rule identifiers such as `GCI1` or `GCI957`.
//!
//! A rule id is a non-empty run of ASCII letters followed by a non-empty run
//! of ASCII digits. Ordering compares the prefix first, then the trailing
//! number numerically, so `GCI9` sorts before `GCI10`.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static GRAMMAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)([0-9]+)$").expect("rule id grammar"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid rule id: {0}")]
/// Raised when a string does not follow the `PREFIX` + digits grammar.
pub struct InvalidRuleId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A validated rule key.
pub struct RuleId {
    raw: String,
    split: usize,
}

impl RuleId {
    pub fn new(raw: &str) -> Result<Self, InvalidRuleId> {
        let caps = GRAMMAR
            .captures(raw)
            .ok_or_else(|| InvalidRuleId(raw.to_string()))?;
        let split = caps.get(1).map(|m| m.end()).unwrap_or(0);
        Ok(RuleId {
            raw: raw.to_string(),
            split,
        })
    }

    /// Letter prefix, e.g. `GCI`.
    pub fn prefix(&self) -> &str {
        &self.raw[..self.split]
    }

    /// Digit suffix exactly as written, e.g. `957`.
    pub fn digits(&self) -> &str {
        &self.raw[self.split..]
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Compare two digit strings by numeric value without parsing, so any length works.
fn cmp_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl Ord for RuleId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.prefix()
            .cmp(other.prefix())
            .then_with(|| cmp_numeric(self.digits(), other.digits()))
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for RuleId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for RuleId {
    type Err = InvalidRuleId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleId::new(s)
    }
}

impl Serialize for RuleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for RuleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RuleId::new(&raw).map_err(serde::de::Error::custom)
    }
}
