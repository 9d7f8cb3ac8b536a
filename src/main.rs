//! tidyhooks CLI binary entry point.
//! Resolves configuration, runs the selected hook and exits with its status.

use clap::Parser;
use tidyhooks::cli::{Cli, Commands, RequirementsTxtArgs, TrailingWhitespaceArgs};
use tidyhooks::config::{self, Effective};
use tidyhooks::{output, requirements, utils, whitespace, HookError};

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    let result = match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Commands::TrailingWhitespace(args) => run_trailing_whitespace(&args),
        Commands::RequirementsTxt(args) => run_requirements_txt(&args),
    };
    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            std::process::exit(e.exit_code());
        }
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Tell the user where targets came from when none were passed explicitly.
fn announce_targets<O>(eff: &Effective<O>, hook: &str, cli_files: usize) {
    if cli_files > 0 || eff.output == "json" {
        return;
    }
    if eff.files.is_empty() {
        eprintln!(
            "{} No files given and no `{}` patterns configured; nothing to do.",
            utils::note_prefix(),
            hook
        );
    } else {
        eprintln!(
            "{} Using configured `{}` patterns: {} file(s)",
            utils::info_prefix(),
            hook,
            eff.files.len()
        );
    }
}

fn run_trailing_whitespace(args: &TrailingWhitespaceArgs) -> Result<i32, HookError> {
    let eff = config::resolve_whitespace(args)?;
    announce_targets(&eff, whitespace::HOOK, args.files.len());
    let report = whitespace::run(&eff.files, &eff.options)?;
    output::print_report(&report, &eff.output, &eff.repo_root);
    Ok(report.exit_code())
}

fn run_requirements_txt(args: &RequirementsTxtArgs) -> Result<i32, HookError> {
    let eff = config::resolve_requirements(args)?;
    announce_targets(&eff, requirements::HOOK, args.files.len());
    let report = requirements::run(&eff.files)?;
    output::print_report(&report, &eff.output, &eff.repo_root);
    Ok(report.exit_code())
}
