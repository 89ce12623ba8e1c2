//! CLI argument parsing via `clap`.

use crate::config::Overrides;
use crate::export::ErrorPolicy;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;

#[derive(Parser)]
#[command(
    name = "rulecat",
    version,
    about = "Export rule descriptions and metadata into a searchable catalogue",
    long_about = "Rulecat copies per-language HTML rule descriptions, resolves their JSON metadata (base document plus optional language override), and writes an index with search terms.\n\nConfiguration precedence: CLI > rulecat.toml > defaults.",
    after_help = "Examples:\n  rulecat export --source rules --target build/site\n  rulecat export --source rules --target build/site --no-index --output json\n  rulecat export --on-error skip --spec-version 2.1.0",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current rulecat version.")]
    Version,
    /// Export the rule catalogue
    #[command(
        about = "Export rules and build the index",
        long_about = "Discover rules under the source tree, copy their descriptions and resolved metadata into the target tree, and write the index document.",
        after_help = "Examples:\n  rulecat export --source rules --target site\n  rulecat export --index site/meta/index.json --min-term-length 3"
    )]
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    #[arg(long, help = "Repository root (default: current dir)")]
    pub repo_root: Option<String>,
    #[arg(long, help = "Source tree holding <KEY>/<lang>/*.html")]
    pub source: Option<String>,
    #[arg(long, help = "Target directory for exported files")]
    pub target: Option<String>,
    #[arg(long, conflicts_with = "no_index", help = "Index file (default: <target>/index.json)")]
    pub index: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Do not write the index")]
    pub no_index: bool,
    #[arg(long, help = "Shortest search term kept (default: 4)")]
    pub min_term_length: Option<usize>,
    #[arg(long, help = "Only export rules whose key starts with this prefix")]
    pub key_prefix: Option<String>,
    #[arg(long, help = "On rule failure: abort|skip (default: abort)")]
    pub on_error: Option<ErrorPolicy>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, help = "Log filter directive when RUST_LOG is unset (default: warn)")]
    pub log: Option<String>,
    #[arg(long, help = "specification.title in the index")]
    pub spec_title: Option<String>,
    #[arg(long, help = "specification.version in the index")]
    pub spec_version: Option<String>,
    #[arg(long, help = "specification.scmRevisionNumber in the index")]
    pub scm_revision_number: Option<String>,
    #[arg(long, help = "specification.scmRevisionDate in the index")]
    pub scm_revision_date: Option<String>,
}

impl From<ExportArgs> for Overrides {
    fn from(a: ExportArgs) -> Self {
        let specification: BTreeMap<String, String> = [
            ("title", a.spec_title),
            ("version", a.spec_version),
            ("scmRevisionNumber", a.scm_revision_number),
            ("scmRevisionDate", a.scm_revision_date),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
        .collect();
        Overrides {
            repo_root: a.repo_root,
            source: a.source,
            target: a.target,
            index: a.index,
            no_index: a.no_index,
            min_term_length: a.min_term_length,
            key_prefix: a.key_prefix,
            on_error: a.on_error,
            output: a.output,
            log: a.log,
            specification,
        }
    }
}
