//! tidyhooks core library.
//!
//! This crate exposes the file-fixing hooks meant to run from a pre-commit
//! style runner. Each hook reads the given files as raw bytes, rewrites them
//! in place when needed and reports an exit status: `0` nothing changed,
//! `1` files rewritten, `2` usage error.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `whitespace`: Trailing-whitespace fixer with Markdown hard breaks.
//! - `requirements`: `requirements.txt` sorter.
//! - `models`: Per-file results and summaries.
//! - `output`: Human/JSON printers.
//! - `error`: Error type and exit codes.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod requirements;
pub mod utils;
pub mod whitespace;

pub use error::HookError;
pub use requirements::fix_requirements_txt;
pub use whitespace::fix_trailing_whitespace;
