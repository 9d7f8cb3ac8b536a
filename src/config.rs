//! Configuration discovery and effective settings resolution.
//!
//! tidyhooks reads `tidyhooks.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config per hook.
//! Defaults:
//! - `output`: `human`
//! - `trailing-whitespace.markdown_linebreak_ext`: `md`, `markdown`
//! - `trailing-whitespace.no_markdown_linebreak_ext`: false
//! - `*.patterns`: empty (files come from the command line)
//!
//! Overrides precedence: CLI > config file > defaults. Markdown extensions
//! accumulate across all three layers.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{RequirementsTxtArgs, TrailingWhitespaceArgs};
use crate::error::HookError;
use crate::utils;
use crate::whitespace::WhitespaceOptions;

const CONFIG_NAMES: [&str; 3] = ["tidyhooks.toml", "tidyhooks.yaml", "tidyhooks.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Section `[trailing-whitespace]`.
pub struct WhitespaceCfg {
    #[serde(default)]
    pub markdown_linebreak_ext: Vec<String>,
    pub no_markdown_linebreak_ext: Option<bool>,
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Section `[requirements-txt]`.
pub struct RequirementsCfg {
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `tidyhooks.toml|yaml`.
pub struct HooksConfig {
    pub output: Option<String>,
    #[serde(default, rename = "trailing-whitespace")]
    pub trailing_whitespace: Option<WhitespaceCfg>,
    #[serde(default, rename = "requirements-txt")]
    pub requirements_txt: Option<RequirementsCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved settings for one hook run after applying precedence.
pub struct Effective<O> {
    pub repo_root: PathBuf,
    pub output: String,
    pub files: Vec<PathBuf>,
    pub options: O,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `tidyhooks.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `HooksConfig` from `tidyhooks.toml` or `tidyhooks.yaml|yml` if present.
pub fn load_config(root: &Path) -> Result<Option<HooksConfig>, HookError> {
    let toml_path = root.join(CONFIG_NAMES[0]);
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).map_err(|e| HookError::io(&toml_path, e))?;
        let cfg: HooksConfig = toml::from_str(&s).map_err(|e| HookError::Config {
            path: toml_path.clone(),
            message: e.to_string(),
        })?;
        return Ok(Some(cfg));
    }
    for yml in &CONFIG_NAMES[1..] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).map_err(|e| HookError::io(&p, e))?;
            let cfg: HooksConfig = serde_yaml::from_str(&s).map_err(|e| HookError::Config {
                path: p.clone(),
                message: e.to_string(),
            })?;
            return Ok(Some(cfg));
        }
    }
    Ok(None)
}

fn discover(cli_repo_root: Option<&str>) -> Result<(PathBuf, HooksConfig), HookError> {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root)?;
    if cfg.is_none() {
        tracing::debug!(root = %repo_root.display(), "no tidyhooks config found; using defaults");
    }
    Ok((repo_root, cfg.unwrap_or_default()))
}

fn resolve_output(cli_output: Option<&str>, cfg: &HooksConfig) -> String {
    cli_output
        .map(|s| s.to_string())
        .or_else(|| cfg.output.clone())
        .unwrap_or_else(|| "human".to_string())
}

fn resolve_files(
    repo_root: &Path,
    cli_files: &[PathBuf],
    patterns: &[String],
) -> Result<Vec<PathBuf>, HookError> {
    if !cli_files.is_empty() {
        return Ok(cli_files.to_vec());
    }
    utils::collect_targets(repo_root, patterns)
}

/// Resolve trailing-whitespace settings against an already loaded config.
pub fn resolve_whitespace_with(
    args: &TrailingWhitespaceArgs,
    repo_root: PathBuf,
    cfg: &HooksConfig,
) -> Result<Effective<WhitespaceOptions>, HookError> {
    let section = cfg.trailing_whitespace.clone().unwrap_or_default();

    let mut tokens = section.markdown_linebreak_ext.clone();
    tokens.extend(args.markdown_linebreak_ext.iter().cloned());

    let no_markdown = args.no_markdown_linebreak_ext
        || section.no_markdown_linebreak_ext.unwrap_or(false);
    let options = WhitespaceOptions::from_tokens(&tokens, no_markdown)?;
    let files = resolve_files(&repo_root, &args.files, &section.patterns)?;

    Ok(Effective {
        output: resolve_output(args.output.as_deref(), cfg),
        repo_root,
        files,
        options,
    })
}

/// Resolve trailing-whitespace settings, discovering the config file.
pub fn resolve_whitespace(
    args: &TrailingWhitespaceArgs,
) -> Result<Effective<WhitespaceOptions>, HookError> {
    let (repo_root, cfg) = discover(args.repo_root.as_deref())?;
    resolve_whitespace_with(args, repo_root, &cfg)
}

/// Resolve requirements-txt settings against an already loaded config.
pub fn resolve_requirements_with(
    args: &RequirementsTxtArgs,
    repo_root: PathBuf,
    cfg: &HooksConfig,
) -> Result<Effective<()>, HookError> {
    let patterns = cfg
        .requirements_txt
        .as_ref()
        .map(|r| r.patterns.clone())
        .unwrap_or_default();
    let files = resolve_files(&repo_root, &args.files, &patterns)?;
    Ok(Effective {
        output: resolve_output(args.output.as_deref(), cfg),
        repo_root,
        files,
        options: (),
    })
}

/// Resolve requirements-txt settings, discovering the config file.
pub fn resolve_requirements(args: &RequirementsTxtArgs) -> Result<Effective<()>, HookError> {
    let (repo_root, cfg) = discover(args.repo_root.as_deref())?;
    resolve_requirements_with(args, repo_root, &cfg)
}
