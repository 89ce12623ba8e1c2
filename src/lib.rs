//! Rulecat core library.
//!
//! This crate exports a tree of rule descriptions into a documentation
//! catalogue: per-language HTML copies, resolved JSON metadata and an index
//! document carrying links and search terms.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `locate`: Rule discovery under the source tree.
//! - `merge`: Base metadata plus RFC 7396 language overrides.
//! - `terms`: Search-term extraction from HTML.
//! - `index`: Index accumulation and serialization.
//! - `export`: Orchestration of a full run.
//! - `models`: Rule ids, rules, the index document and run results.
//! - `output`: Human/JSON printers.
//! - `error`: Error taxonomy.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod index;
pub mod locate;
pub mod merge;
pub mod models;
pub mod output;
pub mod terms;
pub mod utils;
