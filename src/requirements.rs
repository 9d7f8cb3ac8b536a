//! `requirements.txt` sorter.
//!
//! The file is cut into requirement blocks: the comment (and blank) lines
//! preceding an entry travel with it. A blank line that closes a comment
//! block at the very top of the file becomes a marker which always sorts
//! first, so a file header stays in place. Entries are ordered by package
//! name, case-insensitively, with a stable sort so equal names keep their
//! original order.
//!
//! Design notes:
//! - Everything is byte-level; only `#`, `\`, `=`, `;` and ASCII whitespace
//!   are interpreted.
//! - Comment or blank lines after the last entry have nothing to attach to
//!   and are dropped. This is a long-standing quirk of the hook that is kept
//!   for compatibility with existing formatted files.

use clap::Parser;
use regex::bytes::Regex;
use std::cmp::Ordering;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::cli::RequirementsTxtArgs;
use crate::error::HookError;
use crate::models::{FixReport, FixResult};

pub const HOOK: &str = "requirements-txt";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Sortable payload of a requirement block.
pub enum Value {
    /// Blank line closing the top-of-file comment block.
    Marker(Vec<u8>),
    /// A requirement line (with its continuation lines) and its sort key.
    Entry { name: Vec<u8>, raw: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One block: leading comment lines plus the value they belong to.
pub struct Requirement {
    pub comments: Vec<Vec<u8>>,
    pub value: Value,
}

impl Requirement {
    pub fn marker(comments: Vec<Vec<u8>>, line: Vec<u8>) -> Self {
        Self {
            comments,
            value: Value::Marker(line),
        }
    }

    pub fn entry(comments: Vec<Vec<u8>>, raw: Vec<u8>) -> Self {
        Self {
            comments,
            value: Value::Entry {
                name: name_key(&raw),
                raw,
            },
        }
    }

    fn value_line(&self) -> &[u8] {
        match &self.value {
            Value::Marker(line) => line,
            Value::Entry { raw, .. } => raw,
        }
    }
}

/// Block ordering: markers first, then entries by name key.
pub fn compare(a: &Requirement, b: &Requirement) -> Ordering {
    match (&a.value, &b.value) {
        (Value::Marker(_), Value::Marker(_)) => Ordering::Equal,
        (Value::Marker(_), Value::Entry { .. }) => Ordering::Less,
        (Value::Entry { .. }, Value::Marker(_)) => Ordering::Greater,
        (Value::Entry { name: x, .. }, Value::Entry { name: y, .. }) => x.cmp(y),
    }
}

fn egg_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?-u)[#&]egg=(\S*)").expect("valid egg regex"))
}

fn until_sep_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?-u)^[^;\s]+").expect("valid separator regex"))
}

fn until_comparison_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"={2,3}|!=|~=|>=?|<=?").expect("valid comparison regex"))
}

fn is_editable(value: &[u8]) -> bool {
    [&b"-e"[..], &b"--editable"[..]].iter().any(|flag| {
        value
            .strip_prefix(*flag)
            .and_then(|rest| rest.first())
            .is_some_and(|b| b.is_ascii_whitespace() || *b == b'=')
    })
}

/// Sort key of a requirement value (lowercased package name).
///
/// Editable installs use the `#egg=` name (or whatever follows the first
/// `=` when there is no egg fragment). Other entries are cut at the first
/// environment-marker separator or version comparison operator, so
/// `pyramid==1` sorts before `pyramid-foo==2`.
pub fn name_key(raw: &[u8]) -> Vec<u8> {
    let lower = raw.to_ascii_lowercase();
    let value = lower.trim_ascii();

    if is_editable(value) {
        if let Some(egg) = egg_re().captures(value).and_then(|c| c.get(1)) {
            return egg.as_bytes().to_vec();
        }
        return match value.iter().position(|&b| b == b'=') {
            Some(pos) => value[pos + 1..].to_vec(),
            None => value.to_vec(),
        };
    }

    let token = until_sep_re()
        .find(value)
        .map_or(value, |m| m.as_bytes());
    let name = until_comparison_re()
        .find(token)
        .map_or(token, |m| &token[..m.start()]);
    name.to_vec()
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|b| b.is_ascii_whitespace() || *b == b'\x0b')
}

fn continues(line: &[u8]) -> bool {
    line.strip_suffix(b"\r").unwrap_or(line).ends_with(b"\\")
}

/// Split a requirements file into blocks in file order.
///
/// The trailing newline, if any, is not part of the last block.
pub fn parse(contents: &[u8]) -> Vec<Requirement> {
    let body = contents.strip_suffix(b"\n").unwrap_or(contents);
    let mut lines = body.split(|&b| b == b'\n');
    let mut requirements: Vec<Requirement> = Vec::new();
    let mut pending: Vec<Vec<u8>> = Vec::new();

    while let Some(line) = lines.next() {
        if line.starts_with(b"#") {
            pending.push(line.to_vec());
        } else if is_blank(line) {
            let closes_header = requirements.is_empty()
                && pending.first().is_some_and(|c| c.starts_with(b"#"));
            if closes_header {
                requirements.push(Requirement::marker(
                    std::mem::take(&mut pending),
                    line.to_vec(),
                ));
            } else {
                pending.push(line.to_vec());
            }
        } else {
            let mut raw = line.to_vec();
            let mut cur = line;
            while continues(cur) {
                let Some(next) = lines.next() else { break };
                raw.push(b'\n');
                raw.extend_from_slice(next);
                cur = next;
            }
            requirements.push(Requirement::entry(std::mem::take(&mut pending), raw));
        }
    }

    if !pending.is_empty() {
        tracing::debug!(
            lines = pending.len(),
            "dropping trailing lines with no requirement below them"
        );
    }
    requirements
}

/// Serialize blocks back to bytes, one line per comment and value.
pub fn render(requirements: &[Requirement], trailing_newline: bool) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    let lines = requirements
        .iter()
        .flat_map(|r| r.comments.iter().map(Vec::as_slice).chain([r.value_line()]));
    for (i, line) in lines.enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        out.extend_from_slice(line);
    }
    if trailing_newline {
        out.push(b'\n');
    }
    out
}

/// Sort a whole buffer. Returns `None` when the order is already canonical.
pub fn fix_bytes(contents: &[u8]) -> Option<Vec<u8>> {
    if is_blank(contents) {
        return None;
    }
    let trailing_newline = contents.ends_with(b"\n");
    let mut requirements = parse(contents);
    requirements.sort_by(compare);
    let sorted = render(&requirements, trailing_newline);
    (sorted != contents).then_some(sorted)
}

/// Sort one file in place. Returns true when it was rewritten.
pub fn fix_file(path: &Path) -> Result<bool, HookError> {
    let data = fs::read(path).map_err(|e| HookError::io(path, e))?;
    match fix_bytes(&data) {
        Some(sorted) => {
            fs::write(path, sorted).map_err(|e| HookError::io(path, e))?;
            tracing::info!(file = %path.display(), "sorted requirements");
            Ok(true)
        }
        None => {
            tracing::debug!(file = %path.display(), "requirements already sorted");
            Ok(false)
        }
    }
}

/// Sort every file in `files`, in order; the first I/O error aborts the run
/// and later files are left untouched.
pub fn run(files: &[PathBuf]) -> Result<FixReport, HookError> {
    let mut results = Vec::with_capacity(files.len());
    for path in files {
        results.push(FixResult {
            file: path.to_string_lossy().to_string(),
            changed: fix_file(path)?,
        });
    }
    Ok(FixReport::new(HOOK, results))
}

/// Hook entry taking command-line style arguments (without program name).
///
/// Returns `0` when every file was already sorted and `1` otherwise.
/// `--repo-root` and `--output` belong to the binary and are rejected here.
pub fn fix_requirements_txt<I, T>(argv: I) -> Result<i32, HookError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = RequirementsTxtArgs::try_parse_from(
        std::iter::once(OsString::from(HOOK)).chain(argv.into_iter().map(Into::into)),
    )?;
    HookError::binary_only(args.repo_root.as_deref(), args.output.as_deref())?;
    Ok(run(&args.files)?.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn run_on(input: &[u8]) -> (i32, Vec<u8>) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file.txt");
        fs::write(&path, input).unwrap();
        let ret = fix_requirements_txt([path.as_os_str()]).unwrap();
        (ret, fs::read(&path).unwrap())
    }

    #[test]
    fn test_integration_cases() {
        let cases: [(&[u8], i32, &[u8]); 13] = [
            (b"", 0, b""),
            (b"\n", 0, b"\n"),
            (b"foo\nbar\n", 1, b"bar\nfoo\n"),
            (b"bar\nfoo\n", 0, b"bar\nfoo\n"),
            (
                b"#comment1\nfoo\n#comment2\nbar\n",
                1,
                b"#comment2\nbar\n#comment1\nfoo\n",
            ),
            (
                b"#comment1\nbar\n#comment2\nfoo\n",
                0,
                b"#comment1\nbar\n#comment2\nfoo\n",
            ),
            (b"#comment\n\nfoo\nbar\n", 1, b"#comment\n\nbar\nfoo\n"),
            (b"#comment\n\nbar\nfoo\n", 0, b"#comment\n\nbar\nfoo\n"),
            (b"\nfoo\nbar\n", 1, b"bar\n\nfoo\n"),
            (b"\nbar\nfoo\n", 0, b"\nbar\nfoo\n"),
            (b"pyramid==1\npyramid-foo==2\n", 0, b"pyramid==1\npyramid-foo==2\n"),
            (b"ocflib\nDjango\nPyMySQL\n", 1, b"Django\nocflib\nPyMySQL\n"),
            (
                b"-e git+ssh://git_url@tag#egg=ocflib\nDjango\nPyMySQL\n",
                1,
                b"Django\n-e git+ssh://git_url@tag#egg=ocflib\nPyMySQL\n",
            ),
        ];
        for (input, expected_ret, expected) in cases {
            let (ret, out) = run_on(input);
            assert_eq!(
                (ret, out.as_slice()),
                (expected_ret, expected),
                "input {:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn test_requirement_ordering() {
        let top_of_file = Requirement::marker(vec![b"#foo".to_vec()], Vec::new());
        let foo = Requirement::entry(Vec::new(), b"foo".to_vec());
        let bar = Requirement::entry(Vec::new(), b"bar".to_vec());

        assert_eq!(compare(&foo, &top_of_file), Ordering::Greater);
        assert_eq!(compare(&top_of_file, &foo), Ordering::Less);
        assert_eq!(compare(&foo, &bar), Ordering::Greater);
        assert_eq!(compare(&bar, &foo), Ordering::Less);
        assert_eq!(compare(&top_of_file, &top_of_file.clone()), Ordering::Equal);
    }

    #[test]
    fn test_name_key_variants() {
        assert_eq!(name_key(b"Django>=2.0"), b"django".to_vec());
        assert_eq!(name_key(b"requests[socks]~=2.31"), b"requests[socks]".to_vec());
        assert_eq!(name_key(b"pywin32; sys_platform == 'win32'"), b"pywin32".to_vec());
        assert_eq!(name_key(b"-e git+https://x/y.git#egg=Foo"), b"foo".to_vec());
        assert_eq!(name_key(b"-e git+https://x/y.git?a=1&egg=bar"), b"bar".to_vec());
        assert_eq!(name_key(b"--editable=src/pkg"), b"src/pkg".to_vec());
        assert_eq!(name_key(b"-e ./local"), b"-e ./local".to_vec());
    }

    #[test]
    fn test_parse_attaches_comments_and_header_marker() {
        let reqs = parse(b"# header\n\n# about b\nb\n\na\n");
        assert_eq!(reqs.len(), 3);
        assert_eq!(reqs[0], Requirement::marker(vec![b"# header".to_vec()], Vec::new()));
        assert_eq!(reqs[1].comments, vec![b"# about b".to_vec()]);
        assert_eq!(reqs[2].comments, vec![Vec::<u8>::new()]);
    }

    #[test]
    fn test_backslash_continuation_is_one_entry() {
        let input = b"zope.interface==6.0 \\\n    --hash=sha256:abc\nattrs==23.1\n";
        let reqs = parse(input);
        assert_eq!(reqs.len(), 2);
        assert_eq!(
            fix_bytes(input).unwrap(),
            b"attrs==23.1\nzope.interface==6.0 \\\n    --hash=sha256:abc\n".to_vec()
        );
    }

    #[test]
    fn test_missing_final_newline_is_kept() {
        assert_eq!(fix_bytes(b"foo\nbar").unwrap(), b"bar\nfoo".to_vec());
        assert_eq!(fix_bytes(b"bar\nfoo"), None);
    }

    #[test]
    fn test_crlf_lines_survive_sorting() {
        assert_eq!(fix_bytes(b"foo\r\nbar\r\n").unwrap(), b"bar\r\nfoo\r\n".to_vec());
    }

    #[test]
    fn test_equal_names_keep_original_order() {
        assert_eq!(fix_bytes(b"Foo==1\nfoo==2\n"), None);
        assert_eq!(fix_bytes(b"foo==2\nFoo==1\n"), None);
    }

    #[test]
    fn test_whitespace_only_header_separator_round_trips() {
        assert_eq!(fix_bytes(b"# h\n  \nb\na\n").unwrap(), b"# h\n  \na\nb\n".to_vec());
        assert_eq!(fix_bytes(b"# h\n  \na\nb\n"), None);
    }

    #[test]
    fn test_trailing_comments_are_dropped() {
        assert_eq!(fix_bytes(b"foo\n# trailing\n").unwrap(), b"foo\n".to_vec());
    }

    #[test]
    fn test_non_utf8_bytes_pass_through() {
        let input = b"zeta # caf\xe9\nalpha\n";
        assert_eq!(fix_bytes(input).unwrap(), b"alpha\nzeta # caf\xe9\n".to_vec());
    }

    #[test]
    fn test_second_run_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("requirements.txt");
        fs::write(&path, b"# deps\n\nzlib\n# web\nflask\n-e git+x#egg=Attrs\n").unwrap();
        let files = vec![path.clone()];
        assert_eq!(run(&files).unwrap().exit_code(), 1);
        let once = fs::read(&path).unwrap();
        assert_eq!(once, b"# deps\n\n-e git+x#egg=Attrs\n# web\nflask\nzlib\n".to_vec());
        assert_eq!(run(&files).unwrap().exit_code(), 0);
        assert_eq!(fs::read(&path).unwrap(), once);
    }

    #[test]
    fn test_missing_file_aborts_run() {
        let dir = tempdir().unwrap();
        let err = fix_requirements_txt([dir.path().join("nope.txt")]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_io_error_stops_before_later_files() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.txt");
        let last = dir.path().join("c.txt");
        fs::write(&first, b"foo\nbar\n").unwrap();
        fs::write(&last, b"foo\nbar\n").unwrap();
        let files = vec![first.clone(), dir.path().join("b.txt"), last.clone()];
        let err = run(&files).unwrap_err();
        assert!(matches!(err, HookError::Io { .. }));
        assert_eq!(fs::read(&first).unwrap(), b"bar\nfoo\n".to_vec());
        assert_eq!(fs::read(&last).unwrap(), b"foo\nbar\n".to_vec());
    }

    #[test]
    fn test_library_entry_rejects_binary_flags() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("requirements.txt");
        fs::write(&path, b"foo\nbar\n").unwrap();
        for flag in ["--repo-root", "--output"] {
            let argv = [OsString::from(flag), OsString::from("json"), path.clone().into_os_string()];
            let err = fix_requirements_txt(argv).unwrap_err();
            assert_eq!(err.exit_code(), 2, "{flag}");
        }
        assert_eq!(fs::read(&path).unwrap(), b"foo\nbar\n".to_vec());
    }
}
