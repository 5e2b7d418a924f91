//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the guardrail and resolves parameters
//! - runs the quickstart checks or the eval table
//! - prints reports
//! - writes the optional artifact

use std::path::Path;

use chrono::Utc;
use clap::Parser;

use crate::cli::{Command, EvalArgs, QuickstartArgs};
use crate::domain::Guardrail;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `px1` binary.
pub fn run() -> Result<(), AppError> {
    // We want `px1` and `px1 --h0 68` to behave like `px1 quickstart ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Quickstart(args) => handle_quickstart(args),
        Command::Eval(args) => handle_eval(args),
    }
}

fn handle_quickstart(args: QuickstartArgs) -> Result<(), AppError> {
    let guardrail = crate::io::read_guardrail_json(&args.guardrail)?;
    let params = pipeline::resolve_parameters(&guardrail, args.h0, None)?;
    tracing::debug!(?params, "quickstart parameters resolved");

    let run = pipeline::run_quickstart(&guardrail, params)?;
    println!("{}", crate::report::format_quickstart_summary(&run));

    if !args.no_write {
        let artifact = run.to_artifact(Utc::now());
        crate::io::write_artifact_json(&args.out, &artifact)?;
        println!("Saved: {}", args.out.display());
    }

    Ok(())
}

fn handle_eval(args: EvalArgs) -> Result<(), AppError> {
    let guardrail = load_optional_guardrail(args.guardrail.as_deref())?;
    let guardrail = Guardrail {
        mapping: args.mapping.as_str().to_string(),
        ..guardrail
    };
    let params = pipeline::resolve_parameters(&guardrail, args.h0, args.rd)?;

    let rows = pipeline::run_eval(params, &args.redshifts)?;
    print!("{}", crate::report::format_eval_table(&rows));
    Ok(())
}

fn load_optional_guardrail(path: Option<&Path>) -> Result<Guardrail, AppError> {
    match path {
        Some(path) => crate::io::read_guardrail_json(path),
        None => Ok(Guardrail::default()),
    }
}

/// Rewrite argv so `px1` defaults to `px1 quickstart`.
///
/// Rules:
/// - `px1`                      -> `px1 quickstart`
/// - `px1 --h0 68 ...`          -> `px1 quickstart --h0 68 ...`
/// - `px1 --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("quickstart".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "quickstart" | "eval");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "quickstart flags".
    if arg1.starts_with('-') {
        argv.insert(1, "quickstart".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
