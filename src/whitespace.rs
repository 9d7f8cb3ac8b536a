//! Trailing-whitespace fixer.
//!
//! Works on raw bytes: every line is split on `\n`, its terminator (`\n` or
//! `\r\n`) is kept as found, and trailing ASCII whitespace in front of it is
//! removed. Markdown files keep a hard line break (two or more trailing
//! spaces) collapsed to exactly two spaces.
//!
//! A final line without terminator stays unterminated unless it had
//! whitespace stripped, in which case it gets a `\n`.

use clap::Parser;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::TrailingWhitespaceArgs;
use crate::error::HookError;
use crate::models::{FixReport, FixResult};

pub const HOOK: &str = "trailing-whitespace";

/// Extensions always treated as Markdown.
pub const DEFAULT_MARKDOWN_EXTS: [&str; 2] = ["md", "markdown"];

#[derive(Debug, Clone, PartialEq, Eq)]
/// Which file extensions get the Markdown hard-line-break exception.
pub enum MarkdownExts {
    All,
    Only(BTreeSet<String>),
}

#[derive(Debug, Clone)]
/// Options of one trailing-whitespace run.
pub struct WhitespaceOptions {
    pub markdown: MarkdownExts,
    pub no_markdown_linebreak_ext: bool,
}

impl Default for WhitespaceOptions {
    fn default() -> Self {
        Self {
            markdown: MarkdownExts::Only(
                DEFAULT_MARKDOWN_EXTS.iter().map(|e| e.to_string()).collect(),
            ),
            no_markdown_linebreak_ext: false,
        }
    }
}

impl WhitespaceOptions {
    /// Build options from `--markdown-linebreak-ext` values.
    ///
    /// Each value may hold several comma separated extensions; a value that is
    /// exactly `*` enables the exception for every file, while a `*` inside a
    /// list is just another extension. Values are validated with
    /// [`parse_ext_list`], so config-file entries get the same checks as CLI
    /// flags.
    pub fn from_tokens(
        tokens: &[String],
        no_markdown_linebreak_ext: bool,
    ) -> Result<Self, HookError> {
        let mut exts: BTreeSet<String> =
            DEFAULT_MARKDOWN_EXTS.iter().map(|e| e.to_string()).collect();
        let mut all = false;
        for raw in tokens {
            let normalized = parse_ext_list(raw).map_err(HookError::Usage)?;
            if normalized == "*" {
                all = true;
                continue;
            }
            exts.extend(normalized.split(',').map(str::to_string));
        }
        let markdown = if all {
            MarkdownExts::All
        } else {
            MarkdownExts::Only(exts)
        };
        Ok(Self {
            markdown,
            no_markdown_linebreak_ext,
        })
    }

    /// Whether `path` gets the Markdown hard-line-break exception.
    pub fn is_markdown(&self, path: &Path) -> bool {
        if self.no_markdown_linebreak_ext {
            return false;
        }
        match &self.markdown {
            MarkdownExts::All => true,
            MarkdownExts::Only(exts) => path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .is_some_and(|e| exts.contains(&e)),
        }
    }
}

/// Validate one `--markdown-linebreak-ext` value.
///
/// Returns the comma separated extensions lowercased with leading dots
/// removed. Empty entries and entries containing `.`, `/`, `\` or `:` or
/// starting with `-` are rejected.
pub fn parse_ext_list(raw: &str) -> Result<String, String> {
    let mut out: Vec<String> = Vec::new();
    for tok in raw.split(',') {
        let ext = tok.trim_start_matches('.').to_lowercase();
        if ext.is_empty() {
            return Err("--markdown-linebreak-ext requires a non-empty argument".to_string());
        }
        if ext != "*" && (ext.starts_with('-') || ext.contains(['.', '/', '\\', ':'])) {
            return Err(format!(
                "bad --markdown-linebreak-ext extension {tok:?} (has . / \\ :)"
            ));
        }
        out.push(ext);
    }
    Ok(out.join(","))
}

fn is_trailing_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\x0b' | b'\x0c')
}

/// Fix a single line including its terminator.
///
/// Returns the input unchanged (borrowed) when nothing had to be stripped.
pub fn fix_line(line: &[u8], markdown: bool) -> Cow<'_, [u8]> {
    let (body, eol): (&[u8], &[u8]) = if line.ends_with(b"\r\n") {
        line.split_at(line.len() - 2)
    } else if line.ends_with(b"\n") {
        line.split_at(line.len() - 1)
    } else {
        (line, b"")
    };
    let end = body
        .iter()
        .rposition(|&b| !is_trailing_ws(b))
        .map_or(0, |i| i + 1);
    if end == body.len() {
        return Cow::Borrowed(line);
    }

    let hard_break = markdown && end > 0 && body.ends_with(b"  ");
    let mut fixed = Vec::with_capacity(line.len());
    fixed.extend_from_slice(&body[..end]);
    if hard_break {
        fixed.extend_from_slice(b"  ");
    }
    if fixed.as_slice() == body {
        return Cow::Borrowed(line);
    }
    let eol: &[u8] = if eol.is_empty() { b"\n" } else { eol };
    fixed.extend_from_slice(eol);
    Cow::Owned(fixed)
}

/// Fix a whole buffer. Returns `None` when no line changed.
pub fn fix_bytes(contents: &[u8], markdown: bool) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(contents.len());
    let mut changed = false;
    for line in contents.split_inclusive(|&b| b == b'\n') {
        let fixed = fix_line(line, markdown);
        changed |= matches!(fixed, Cow::Owned(_));
        out.extend_from_slice(&fixed);
    }
    changed.then_some(out)
}

/// Fix one file in place. Returns true when it was rewritten.
pub fn fix_file(path: &Path, options: &WhitespaceOptions) -> Result<bool, HookError> {
    let data = fs::read(path).map_err(|e| HookError::io(path, e))?;
    let markdown = options.is_markdown(path);
    match fix_bytes(&data, markdown) {
        Some(fixed) => {
            fs::write(path, fixed).map_err(|e| HookError::io(path, e))?;
            tracing::info!(file = %path.display(), markdown, "fixed trailing whitespace");
            Ok(true)
        }
        None => {
            tracing::debug!(file = %path.display(), "no trailing whitespace");
            Ok(false)
        }
    }
}

/// Fix every file in `files`, in order; the first I/O error aborts the run
/// and later files are left untouched.
pub fn run(files: &[PathBuf], options: &WhitespaceOptions) -> Result<FixReport, HookError> {
    let mut results = Vec::with_capacity(files.len());
    for path in files {
        results.push(FixResult {
            file: path.to_string_lossy().to_string(),
            changed: fix_file(path, options)?,
        });
    }
    Ok(FixReport::new(HOOK, results))
}

/// Hook entry taking command-line style arguments (without program name).
///
/// Returns `0` when nothing changed and `1` when any file was rewritten.
/// Usage errors come back as `HookError::Cli` whose exit code is `2`. No
/// config file is consulted here; the binary layers that on top, so
/// `--repo-root` and `--output` are rejected with exit code `2`.
pub fn fix_trailing_whitespace<I, T>(argv: I) -> Result<i32, HookError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = TrailingWhitespaceArgs::try_parse_from(
        std::iter::once(OsString::from(HOOK)).chain(argv.into_iter().map(Into::into)),
    )?;
    HookError::binary_only(args.repo_root.as_deref(), args.output.as_deref())?;
    let options = WhitespaceOptions::from_tokens(
        &args.markdown_linebreak_ext,
        args.no_markdown_linebreak_ext,
    )?;
    Ok(run(&args.files, &options)?.exit_code())
}
