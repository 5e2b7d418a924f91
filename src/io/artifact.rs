//! Write the quickstart artifact JSON.
//!
//! The artifact is the machine-readable record of one quickstart run: the
//! guardrail it was configured from, the parameters actually used, and every
//! computed check. Field names follow the established artifact schema.

use std::fs::{File, create_dir_all};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Guardrail;
use crate::error::AppError;

/// Default artifact location, relative to the working directory.
pub const DEFAULT_ARTIFACT_PATH: &str = "results/quickstart_smoke.json";

/// First-order Hubble-law check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmallZCheck {
    pub z: f64,
    #[serde(rename = "DL_over_z_Mpc")]
    pub dl_over_z_mpc: f64,
    #[serde(rename = "target_c_over_H0_Mpc")]
    pub target_c_over_h0_mpc: f64,
}

/// One BAO row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaoRow {
    pub z: f64,
    #[serde(rename = "DM_over_rd")]
    pub dm_over_rd: f64,
    #[serde(rename = "DH_over_rd")]
    pub dh_over_rd: f64,
}

/// CMB acoustic-scale summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmbSummary {
    pub z_star: f64,
    #[serde(rename = "DA_Mpc")]
    pub da_mpc: f64,
    #[serde(rename = "DM_Mpc")]
    pub dm_mpc: f64,
    #[serde(rename = "ell_A")]
    pub ell_a: f64,
}

/// Full quickstart artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickstartArtifact {
    pub timestamp_utc: String,
    pub guardrail: Guardrail,
    #[serde(rename = "H0")]
    pub h0: f64,
    #[serde(rename = "rd_proxy_Mpc")]
    pub rd_proxy_mpc: f64,
    pub small_z: SmallZCheck,
    pub bao: Vec<BaoRow>,
    pub cmb: CmbSummary,
}

/// Write the artifact as pretty JSON, creating parent directories as needed.
pub fn write_artifact_json(path: &Path, artifact: &QuickstartArtifact) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).map_err(|e| {
            AppError::new(2, format!("Failed to create artifact dir '{}': {e}", parent.display()))
        })?;
    }

    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create artifact JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, artifact)
        .map_err(|e| AppError::new(2, format!("Failed to write artifact JSON: {e}")))?;

    tracing::info!(path = %path.display(), "artifact written");
    Ok(())
}

/// Read an artifact back (used by tests and downstream comparisons).
pub fn read_artifact_json(path: &Path) -> Result<QuickstartArtifact, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open artifact JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid artifact JSON: {e}")))
}
