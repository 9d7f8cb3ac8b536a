//! CLI argument parsing via `clap`.
//!
//! Each hook has its own argument struct so it can be parsed standalone
//! (the way a pre-commit runner invokes a single hook) or as a subcommand
//! of the `tidyhooks` binary.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::whitespace::parse_ext_list;

#[derive(Parser)]
#[command(
    name = "tidyhooks",
    version,
    about = "Pre-commit hooks for trailing whitespace and requirements.txt ordering",
    long_about = "tidyhooks — file-fixing hooks meant to run from a pre-commit runner.\n\nExit codes: 0 = nothing changed, 1 = files rewritten, 2 = usage error, 3 = I/O error.\nConfiguration precedence: CLI > tidyhooks.toml > defaults.",
    after_help = "Examples:\n  tidyhooks trailing-whitespace README.md src/lib.rs\n  tidyhooks trailing-whitespace --markdown-linebreak-ext=txt,rst notes.txt\n  tidyhooks requirements-txt requirements.txt requirements-dev.txt",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported hooks.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current tidyhooks version.")]
    Version,
    /// Strip trailing whitespace
    #[command(
        about = "Strip trailing whitespace",
        long_about = "Remove trailing whitespace from every line. Markdown files keep a two-space hard line break.",
        after_help = "Examples:\n  tidyhooks trailing-whitespace docs/index.md\n  tidyhooks trailing-whitespace --markdown-linebreak-ext='*' notes"
    )]
    TrailingWhitespace(TrailingWhitespaceArgs),
    /// Sort requirements files
    #[command(
        about = "Sort requirements.txt entries",
        long_about = "Sort requirement entries case-insensitively by package name. Comments travel with the entry below them.",
        after_help = "Examples:\n  tidyhooks requirements-txt requirements.txt"
    )]
    RequirementsTxt(RequirementsTxtArgs),
}

#[derive(Parser, Debug, Default)]
#[command(name = "trailing-whitespace")]
/// Arguments of the trailing-whitespace hook.
pub struct TrailingWhitespaceArgs {
    #[arg(value_name = "FILES", help = "Files to fix (default: config patterns)")]
    pub files: Vec<PathBuf>,
    #[arg(
        long = "markdown-linebreak-ext",
        value_name = "*|EXT[,EXT,...]",
        num_args = 0..=1,
        default_missing_value = "",
        value_parser = parse_ext_list,
        action = ArgAction::Append,
        help = "Extra extensions treated as Markdown (comma separated, repeatable, '*' for all)"
    )]
    pub markdown_linebreak_ext: Vec<String>,
    #[arg(long, action = ArgAction::SetTrue, help = "Never preserve Markdown hard line breaks")]
    pub no_markdown_linebreak_ext: bool,
    #[arg(long, help = "Repository root (default: current dir)")]
    pub repo_root: Option<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
}

#[derive(Parser, Debug, Default)]
#[command(name = "requirements-txt")]
/// Arguments of the requirements-txt hook.
pub struct RequirementsTxtArgs {
    #[arg(value_name = "FILES", help = "Requirements files to sort (default: config patterns)")]
    pub files: Vec<PathBuf>,
    #[arg(long, help = "Repository root (default: current dir)")]
    pub repo_root: Option<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
}
