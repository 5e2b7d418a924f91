//! Command-line parsing for the PX1 observables driver.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the model/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Mapping;
use crate::io::{DEFAULT_ARTIFACT_PATH, DEFAULT_GUARDRAIL_PATH};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "px1", version, about = "PX1 cosmology observables (distances, BAO, CMB)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the guardrail sanity checks (small-z slope, BAO rows, CMB ℓ_A) and write an artifact.
    Quickstart(QuickstartArgs),
    /// Print every observable at the given redshifts.
    Eval(EvalArgs),
}

/// Options for the quickstart run.
#[derive(Debug, Parser, Clone)]
pub struct QuickstartArgs {
    /// Guardrail JSON with canonical parameters.
    #[arg(long, value_name = "JSON", default_value = DEFAULT_GUARDRAIL_PATH)]
    pub guardrail: PathBuf,

    /// Where to write the artifact JSON.
    #[arg(long, value_name = "JSON", default_value = DEFAULT_ARTIFACT_PATH)]
    pub out: PathBuf,

    /// Skip writing the artifact.
    #[arg(long)]
    pub no_write: bool,

    /// Override the guardrail Hubble constant (km/s/Mpc).
    #[arg(long)]
    pub h0: Option<f64>,
}

/// Options for evaluating observables.
#[derive(Debug, Parser, Clone)]
pub struct EvalArgs {
    /// Comma-separated redshifts (z >= 0).
    #[arg(long = "z", value_name = "Z,...", value_delimiter = ',', required = true, allow_hyphen_values = true)]
    pub redshifts: Vec<f64>,

    /// Optional guardrail JSON; built-in defaults are used otherwise.
    #[arg(long, value_name = "JSON")]
    pub guardrail: Option<PathBuf>,

    /// Hubble constant override (km/s/Mpc).
    #[arg(long)]
    pub h0: Option<f64>,

    /// Sound horizon override (Mpc).
    #[arg(long)]
    pub rd: Option<f64>,

    /// Redshift mapping.
    #[arg(long, value_enum, default_value_t = Mapping::Px1)]
    pub mapping: Mapping,
}
