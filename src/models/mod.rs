//! Shared result models produced by the hooks and consumed by printers.

use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
/// Outcome for a single file.
pub struct FixResult {
    pub file: String,
    pub changed: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
/// Aggregated counts used by printers.
pub struct Summary {
    pub changed: usize,
    pub total: usize,
}

#[derive(Serialize, Debug, Clone)]
/// Results of one hook invocation.
pub struct FixReport {
    pub hook: &'static str,
    pub results: Vec<FixResult>,
    pub summary: Summary,
}

impl FixReport {
    pub fn new(hook: &'static str, results: Vec<FixResult>) -> Self {
        let summary = Summary {
            changed: results.iter().filter(|r| r.changed).count(),
            total: results.len(),
        };
        Self {
            hook,
            results,
            summary,
        }
    }

    /// `1` when any file was rewritten, `0` otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.summary.changed > 0 {
            1
        } else {
            0
        }
    }
}
