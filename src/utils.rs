//! Supporting helpers: message prefixes, target collection, display paths.

use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

use crate::error::HookError;

/// Whether colored output is allowed for the given output mode.
pub fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn prefix(label: &str, paint: fn(&str) -> String) -> String {
    if use_colors("human") {
        paint(label)
    } else {
        label.to_string()
    }
}

pub fn error_prefix() -> String {
    prefix("error:", |s| s.red().bold().to_string())
}

pub fn note_prefix() -> String {
    prefix("note:", |s| s.yellow().bold().to_string())
}

pub fn info_prefix() -> String {
    prefix("info:", |s| s.blue().bold().to_string())
}

/// Expand glob `patterns` relative to `root`, keeping only regular files.
///
/// Matches are deduplicated and returned in lexicographic order so runs are
/// deterministic.
pub fn collect_targets(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, HookError> {
    let mut targets: Vec<PathBuf> = Vec::new();
    for pat in patterns {
        let abs_glob = root.join(pat);
        let pattern = abs_glob.to_string_lossy().to_string();
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) if path.is_file() => targets.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "skipping unreadable glob match"),
            }
        }
    }
    targets.sort();
    targets.dedup();
    Ok(targets)
}

/// Render `path` relative to `root` when possible.
pub fn display_path(path: &Path, root: &Path) -> String {
    let rel = if path.is_absolute() {
        let abs_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        pathdiff::diff_paths(path, &abs_root).filter(|p| !p.starts_with(".."))
    } else {
        None
    };
    rel.unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}
