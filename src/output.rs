//! Output rendering for the export command.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-rule fields, skipped failures and a top-level summary.

use crate::models::RunResult;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Print an export run in the requested format.
pub fn print_run(res: &RunResult, output: &str) {
    match output {
        "json" => match serde_json::to_string_pretty(&compose_run_json(res)) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("{} {}", crate::utils::error_prefix(), e),
        },
        _ => {
            for line in compose_run_lines(res, use_colors(output)) {
                println!("{}", line);
            }
        }
    }
}

/// Human-readable lines, one per exported rule and failure, then the summary.
pub fn compose_run_lines(res: &RunResult, color: bool) -> Vec<String> {
    let mut lines = Vec::with_capacity(res.rules.len() + res.failures.len() + 2);
    for r in &res.rules {
        let label = if r.merged { "merged:" } else { "exported:" };
        let id = format!("{} ({})", r.key, r.language);
        if color {
            lines.push(format!(
                "{} {} -> {} [{} terms]",
                label.green().bold(),
                id.bold(),
                r.html,
                r.terms
            ));
        } else {
            lines.push(format!("{} {} -> {} [{} terms]", label, id, r.html, r.terms));
        }
    }
    for f in &res.failures {
        let id = format!("{} ({})", f.key, f.language);
        if color {
            lines.push(format!("{} {} {}", "skipped:".yellow().bold(), id.bold(), f.message));
        } else {
            lines.push(format!("skipped: {} {}", id, f.message));
        }
    }
    match &res.index {
        Some(p) if color => lines.push(format!("{} {}", "index:".cyan().bold(), p)),
        Some(p) => lines.push(format!("index: {}", p)),
        None => {}
    }
    let summary = format!(
        "Summary: rules={} languages={} merged={} failures={}",
        res.summary.rules, res.summary.languages, res.summary.merged, res.summary.failures
    );
    if color {
        lines.push(summary.bold().to_string());
    } else {
        lines.push(summary);
    }
    lines
}

/// Compose run JSON object (pure) for testing/snapshot purposes.
pub fn compose_run_json(res: &RunResult) -> JsonVal {
    json!({
        "results": res.rules,
        "failures": res.failures,
        "index": res.index,
        "summary": res.summary,
    })
}
