//! Output rendering for hook runs.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-file fields and a top-level summary.

use crate::models::FixReport;
use crate::utils::{display_path, use_colors};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::Path;

fn action_label(hook: &str) -> &'static str {
    match hook {
        "requirements-txt" => "sorted:",
        _ => "fixed:",
    }
}

/// Print a hook report in the requested format.
///
/// Human mode lists only rewritten files; a clean run prints nothing.
pub fn print_report(report: &FixReport, output: &str, repo_root: &Path) {
    match output {
        "json" => match serde_json::to_string_pretty(&compose_report_json(report, repo_root)) {
            Ok(s) => println!("{}", s),
            Err(e) => tracing::error!(error = %e, "failed to serialize report"),
        },
        _ => {
            let color = use_colors(output);
            let label = action_label(report.hook);
            for r in report.results.iter().filter(|r| r.changed) {
                let file = display_path(Path::new(&r.file), repo_root);
                if color {
                    println!("{} {}", label.green().bold(), file.bold());
                } else {
                    println!("{} {}", label, file);
                }
            }
        }
    }
}

/// Compose the JSON object for a report (pure) for testing purposes.
pub fn compose_report_json(report: &FixReport, repo_root: &Path) -> JsonVal {
    let items: Vec<_> = report
        .results
        .iter()
        .map(|r| {
            json!({
                "file": display_path(Path::new(&r.file), repo_root),
                "changed": r.changed,
            })
        })
        .collect();
    json!({
        "hook": report.hook,
        "results": items,
        "summary": report.summary,
    })
}
