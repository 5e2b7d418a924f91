//! Shared evaluation pipelines used by the CLI commands.
//!
//! Keeping these here separates the workflow from presentation:
//! guardrail -> parameters -> model -> checks/rows
//!
//! The CLI then only decides what to print and what to write.

use chrono::{DateTime, SecondsFormat, Utc};
use rayon::prelude::*;

use crate::domain::{C_KM_S, Guardrail, Parameters};
use crate::error::{AppError, ModelError};
use crate::io::{BaoRow, CmbSummary, QuickstartArtifact, SmallZCheck};
use crate::models::{CacheStats, Px1Model};

/// Redshift used for the first-order Hubble-law check.
pub const SMALL_Z: f64 = 0.01;

/// Redshifts of the BAO sanity rows.
pub const BAO_REDSHIFTS: [f64; 5] = [0.35, 0.57, 0.70, 1.00, 1.50];

/// All computed outputs of a single quickstart run.
#[derive(Debug, Clone)]
pub struct QuickstartRun {
    pub guardrail: Guardrail,
    pub params: Parameters,
    pub small_z: SmallZCheck,
    pub bao: Vec<BaoRow>,
    pub cmb: CmbSummary,
    pub cache: CacheStats,
}

impl QuickstartRun {
    /// Package the run as a serializable artifact stamped with `at`.
    pub fn to_artifact(&self, at: DateTime<Utc>) -> QuickstartArtifact {
        QuickstartArtifact {
            timestamp_utc: at.to_rfc3339_opts(SecondsFormat::Secs, true),
            guardrail: self.guardrail.clone(),
            h0: self.params.h0,
            rd_proxy_mpc: self.params.rd,
            small_z: self.small_z.clone(),
            bao: self.bao.clone(),
            cmb: self.cmb.clone(),
        }
    }
}

/// Resolve run parameters from a guardrail plus optional overrides.
pub fn resolve_parameters(
    guardrail: &Guardrail,
    h0: Option<f64>,
    rd: Option<f64>,
) -> Result<Parameters, AppError> {
    let base = guardrail.parameters()?;
    let params = Parameters::new(
        h0.unwrap_or(base.h0),
        rd.unwrap_or(base.rd),
        base.mapping,
        base.z_star,
    )?;
    Ok(params)
}

/// Run the quickstart checks: small-z slope, BAO rows, CMB anchor.
pub fn run_quickstart(guardrail: &Guardrail, params: Parameters) -> Result<QuickstartRun, AppError> {
    let model = Px1Model::with_parameters(params);

    let dl = model.luminosity_distance(SMALL_Z)?;
    let small_z = SmallZCheck {
        z: SMALL_Z,
        dl_over_z_mpc: dl / SMALL_Z,
        target_c_over_h0_mpc: C_KM_S / params.h0,
    };

    let bao = BAO_REDSHIFTS
        .iter()
        .map(|&z| -> Result<BaoRow, ModelError> {
            Ok(BaoRow {
                z,
                dm_over_rd: model.bao_dm_over_rd(z)?,
                dh_over_rd: model.bao_dh_over_rd(z)?,
            })
        })
        .collect::<Result<Vec<_>, ModelError>>()?;

    let anchor = model.cmb_anchor()?;
    let cmb = CmbSummary {
        z_star: anchor.z_star,
        da_mpc: anchor.da,
        dm_mpc: anchor.dm,
        ell_a: anchor.ell_a,
    };

    let cache = model.cache_stats();
    tracing::debug!(?cache, "quickstart finished");

    Ok(QuickstartRun {
        guardrail: guardrail.clone(),
        params,
        small_z,
        bao,
        cmb,
        cache,
    })
}

/// Every observable at one redshift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalRow {
    pub z: f64,
    pub w: f64,
    pub e: f64,
    pub hubble: f64,
    pub dm: f64,
    pub dl: f64,
    pub da: f64,
    pub dh: f64,
    pub dm_over_rd: f64,
    pub dh_over_rd: f64,
}

fn eval_row(model: &Px1Model, z: f64) -> Result<EvalRow, ModelError> {
    Ok(EvalRow {
        z,
        w: model.w_emit(z)?,
        e: model.expansion_rate(z)?,
        hubble: model.hubble(z)?,
        dm: model.comoving_angular_distance(z)?,
        dl: model.luminosity_distance(z)?,
        da: model.angular_diameter_distance(z)?,
        dh: model.hubble_distance(z)?,
        dm_over_rd: model.bao_dm_over_rd(z)?,
        dh_over_rd: model.bao_dh_over_rd(z)?,
    })
}

/// Evaluate all observables at each redshift, in parallel.
///
/// Models are not shareable across threads, so each rayon worker builds its
/// own instance. Output order matches `zs`.
pub fn run_eval(params: Parameters, zs: &[f64]) -> Result<Vec<EvalRow>, AppError> {
    if zs.is_empty() {
        return Err(AppError::new(2, "No redshifts given (use --z 0.35,0.57,...)."));
    }
    let rows = zs
        .par_iter()
        .map_init(
            || Px1Model::with_parameters(params),
            |model, &z| eval_row(model, z),
        )
        .collect::<Result<Vec<_>, ModelError>>()?;
    Ok(rows)
}
