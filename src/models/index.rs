//! Index document schema consumed by the documentation website.
//!
//! `rules` is keyed by rule id, then by language. Both levels are
//! `BTreeMap`s so the serialized document is always in sorted order.

use super::rule_id::RuleId;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;

pub type RulesByKey = BTreeMap<RuleId, BTreeMap<String, IndexEntry>>;

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
/// Top-level index document.
pub struct IndexDocument {
    #[serde(default)]
    pub specification: BTreeMap<String, String>,
    #[serde(default)]
    pub rules: RulesByKey,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// One rule in one language.
pub struct IndexEntry {
    pub key: String,
    pub language: String,
    pub links: Vec<Link>,
    pub html_description: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_severity: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Search terms keyed by the language of the terms (`en`).
    pub terms: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A typed reference to a copied artifact (`description` or `metadata`).
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hreflang: Option<String>,
}
