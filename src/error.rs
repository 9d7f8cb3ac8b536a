//! Error type shared by both hooks and its exit-code mapping.

use std::path::PathBuf;

/// Exit code for usage and configuration errors.
pub const EXIT_USAGE: i32 = 2;
/// Exit code for read/write failures.
pub const EXIT_IO: i32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl HookError {
    /// Reject binary-only flags (`--repo-root`, `--output`) on the library entry points.
    pub(crate) fn binary_only(repo_root: Option<&str>, output: Option<&str>) -> Result<(), Self> {
        let flag = match (repo_root, output) {
            (Some(_), _) => "--repo-root",
            (None, Some(_)) => "--output",
            (None, None) => return Ok(()),
        };
        Err(Self::Usage(format!(
            "{flag} is only supported by the tidyhooks binary"
        )))
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error (help/version requests from clap map to 0).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cli(e) => e.exit_code(),
            Self::Io { .. } => EXIT_IO,
            Self::Usage(_) | Self::Config { .. } | Self::Pattern(_) => EXIT_USAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_from_status_domain() {
        let usage = HookError::Usage("bad".into());
        assert_eq!(usage.exit_code(), 2);
        let io = HookError::io(
            "missing.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(io.exit_code(), 3);
        assert!(io.to_string().contains("missing.txt"));
    }
}
