//! The PX1 model facade: parameters in, observables out.
//!
//! `Px1Model` owns the whole evaluation stack (inversion → expansion →
//! distances) plus an optional parameter source. Every parameter read goes
//! through one accessor that falls back to documented defaults, so a model
//! built without any source is fully usable.
//!
//! Each observable has a scalar entry point and a `_many` entry point that maps
//! the scalar one over a slice, preserving order and stopping at the first
//! error.

use std::f64::consts::PI;

use crate::domain::{
    C_KM_S, DEFAULT_H0, DEFAULT_RD, DEFAULT_Z_STAR, Mapping, ParamError, ParamValue,
    ParameterSource, Parameters,
};
use crate::error::ModelError;
use crate::math::{Brent, GaussKronrod, QuadTolerance, RootTolerance};
use crate::models::distance::DistanceEngine;
use crate::models::expansion::ExpansionModel;
use crate::models::inversion::RedshiftInverter;

/// Hubble distance `c/H`, or `0.0` when `H` is non-finite or non-positive.
pub fn hubble_distance_from(hubble: f64) -> f64 {
    if hubble.is_finite() && hubble > 0.0 {
        C_KM_S / hubble
    } else {
        0.0
    }
}

/// CMB acoustic-scale quantities at the anchor redshift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CmbAnchor {
    pub z_star: f64,
    /// `D_M(z*)` in Mpc.
    pub dm: f64,
    /// `D_A(z*) = D_M(z*)/(1+z*)` in Mpc.
    pub da: f64,
    /// `ℓ_A = π D_A(z*) / rd`.
    pub ell_a: f64,
}

/// Memo table sizes, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub w: usize,
    pub e: usize,
    pub h: usize,
    pub dm: usize,
    pub dl: usize,
}

/// PX1 cosmology model.
pub struct Px1Model {
    source: Option<Box<dyn ParameterSource + Send>>,
    mapping: Mapping,
    engine: DistanceEngine<Brent, GaussKronrod>,
}

impl std::fmt::Debug for Px1Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Px1Model")
            .field("has_source", &self.source.is_some())
            .field("mapping", &self.mapping)
            .field("cache", &self.cache_stats())
            .finish()
    }
}

impl Px1Model {
    /// Model with no parameter source: every parameter takes its default.
    pub fn standalone() -> Self {
        Self::build(None, Mapping::Px1)
    }

    /// Model bound to `source`. Fails only if the source names a mapping other
    /// than PX1.
    pub fn new<S>(source: S) -> Result<Self, ModelError>
    where
        S: ParameterSource + Send + 'static,
    {
        let source: Box<dyn ParameterSource + Send> = Box::new(source);
        let mapping = resolve_mapping(source.as_ref())?;
        Ok(Self::build(Some(source), mapping))
    }

    /// Model bound to validated [`Parameters`].
    pub fn with_parameters(params: Parameters) -> Self {
        let mapping = params.mapping;
        Self::build(Some(Box::new(params)), mapping)
    }

    fn build(source: Option<Box<dyn ParameterSource + Send>>, mapping: Mapping) -> Self {
        let inverter = RedshiftInverter::new(Brent, RootTolerance::default());
        let engine = DistanceEngine::new(
            ExpansionModel::new(inverter),
            GaussKronrod,
            QuadTolerance::default(),
        );
        Self {
            source,
            mapping,
            engine,
        }
    }

    // ---- parameters ----

    /// Read a numeric parameter, falling back to `default` when there is no
    /// source, the lookup fails, or the value is not numeric.
    pub fn param_f64(&self, name: &str, default: f64) -> f64 {
        let Some(source) = self.source.as_deref() else {
            return default;
        };
        match source.get_param(name) {
            Ok(value) => match value.as_f64() {
                Some(v) => v,
                None => {
                    tracing::debug!(name, ?value, default, "non-numeric parameter; using default");
                    default
                }
            },
            Err(err) => {
                tracing::debug!(name, %err, default, "parameter lookup failed; using default");
                default
            }
        }
    }

    pub fn h0(&self) -> f64 {
        self.param_f64("H0", DEFAULT_H0)
    }

    pub fn rd(&self) -> f64 {
        self.param_f64("rd", DEFAULT_RD)
    }

    pub fn z_star(&self) -> f64 {
        self.param_f64("z_star", DEFAULT_Z_STAR)
    }

    pub fn mapping(&self) -> Mapping {
        self.mapping
    }

    // ---- core quantities ----

    pub fn w_emit(&self, z: f64) -> Result<f64, ModelError> {
        self.engine.expansion().inverter().w_emit(z)
    }

    pub fn w_emit_many(&self, zs: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.each(zs, Self::w_emit)
    }

    /// Dimensionless `E(z)`; `+∞` marks a degenerate point.
    pub fn expansion_rate(&self, z: f64) -> Result<f64, ModelError> {
        self.engine.expansion().expansion_rate(z)
    }

    pub fn expansion_rate_many(&self, zs: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.each(zs, Self::expansion_rate)
    }

    /// `H(z)` in km/s/Mpc.
    pub fn hubble(&self, z: f64) -> Result<f64, ModelError> {
        self.engine.expansion().hubble(z, self.h0())
    }

    pub fn hubble_many(&self, zs: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.each(zs, Self::hubble)
    }

    pub fn comoving_angular_distance(&self, z: f64) -> Result<f64, ModelError> {
        self.engine.comoving_angular_distance(z, self.h0())
    }

    pub fn comoving_angular_distance_many(&self, zs: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.each(zs, Self::comoving_angular_distance)
    }

    pub fn luminosity_distance(&self, z: f64) -> Result<f64, ModelError> {
        self.engine.luminosity_distance(z, self.h0())
    }

    pub fn luminosity_distance_many(&self, zs: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.each(zs, Self::luminosity_distance)
    }

    pub fn angular_diameter_distance(&self, z: f64) -> Result<f64, ModelError> {
        self.engine.angular_diameter_distance(z, self.h0())
    }

    pub fn angular_diameter_distance_many(&self, zs: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.each(zs, Self::angular_diameter_distance)
    }

    // ---- BAO / CMB ----

    /// Hubble distance `D_H = c/H(z)` in Mpc; `0.0` at degenerate points.
    pub fn hubble_distance(&self, z: f64) -> Result<f64, ModelError> {
        Ok(hubble_distance_from(self.hubble(z)?))
    }

    pub fn hubble_distance_many(&self, zs: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.each(zs, Self::hubble_distance)
    }

    pub fn bao_dm_over_rd(&self, z: f64) -> Result<f64, ModelError> {
        Ok(self.comoving_angular_distance(z)? / self.rd())
    }

    pub fn bao_dm_over_rd_many(&self, zs: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.each(zs, Self::bao_dm_over_rd)
    }

    pub fn bao_dh_over_rd(&self, z: f64) -> Result<f64, ModelError> {
        Ok(self.hubble_distance(z)? / self.rd())
    }

    pub fn bao_dh_over_rd_many(&self, zs: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.each(zs, Self::bao_dh_over_rd)
    }

    /// Acoustic-scale quantities at an explicit anchor redshift.
    pub fn cmb_anchor_at(&self, z_star: f64) -> Result<CmbAnchor, ModelError> {
        let dm = self.comoving_angular_distance(z_star)?;
        let da = if z_star > 0.0 { dm / (1.0 + z_star) } else { 0.0 };
        Ok(CmbAnchor {
            z_star,
            dm,
            da,
            ell_a: PI * da / self.rd(),
        })
    }

    /// Acoustic-scale quantities at the parameterized `z_star`.
    pub fn cmb_anchor(&self) -> Result<CmbAnchor, ModelError> {
        self.cmb_anchor_at(self.z_star())
    }

    /// `ℓ_A = π D_A(z*) / rd`.
    pub fn ell_a(&self) -> Result<f64, ModelError> {
        Ok(self.cmb_anchor()?.ell_a)
    }

    pub fn cache_stats(&self) -> CacheStats {
        let (w, e, h) = self.engine.expansion().cached();
        let (dm, dl) = self.engine.cached();
        CacheStats { w, e, h, dm, dl }
    }

    fn each<F>(&self, zs: &[f64], f: F) -> Result<Vec<f64>, ModelError>
    where
        F: Fn(&Self, f64) -> Result<f64, ModelError>,
    {
        zs.iter().map(|&z| f(self, z)).collect()
    }
}

impl Default for Px1Model {
    fn default() -> Self {
        Self::standalone()
    }
}

/// The model itself is a parameter source: it answers with whatever its
/// accessor resolves, defaults included.
impl ParameterSource for Px1Model {
    fn get_param(&self, name: &str) -> Result<ParamValue, ParamError> {
        match name {
            "H0" => Ok(ParamValue::Float(self.h0())),
            "rd" => Ok(ParamValue::Float(self.rd())),
            "z_star" => Ok(ParamValue::Float(self.z_star())),
            "mapping" => Ok(ParamValue::Text(self.mapping.as_str().to_string())),
            other => Err(ParamError::Unknown(other.to_string())),
        }
    }
}

fn resolve_mapping(source: &dyn ParameterSource) -> Result<Mapping, ModelError> {
    match source.get_param("mapping") {
        Ok(value) => match value.as_str() {
            Some(text) => text.parse(),
            None => {
                tracing::debug!(?value, "non-text mapping parameter; using px1");
                Ok(Mapping::Px1)
            }
        },
        Err(err) => {
            tracing::debug!(%err, "mapping lookup failed; using px1");
            Ok(Mapping::Px1)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Source backed by a plain map; missing names fail the lookup.
    struct MapSource(HashMap<&'static str, ParamValue>);

    impl ParameterSource for MapSource {
        fn get_param(&self, name: &str) -> Result<ParamValue, ParamError> {
            self.0
                .get(name)
                .cloned()
                .ok_or_else(|| ParamError::Unavailable(name.to_string()))
        }
    }

    /// Source that is present but never answers.
    struct BrokenSource;

    impl ParameterSource for BrokenSource {
        fn get_param(&self, name: &str) -> Result<ParamValue, ParamError> {
            Err(ParamError::Unavailable(name.to_string()))
        }
    }

    const BAO_Z: [f64; 5] = [0.35, 0.57, 0.70, 1.00, 1.50];

    #[test]
    fn standalone_model_uses_documented_defaults() {
        let m = Px1Model::standalone();
        assert_eq!(m.h0(), 70.0);
        assert_eq!(m.rd(), 147.0);
        assert_eq!(m.z_star(), 1090.0);
        assert_eq!(m.mapping(), Mapping::Px1);
    }

    #[test]
    fn failing_source_degrades_to_defaults() {
        let m = Px1Model::new(BrokenSource).unwrap();
        assert_eq!(m.h0(), 70.0);
        assert_eq!(m.rd(), 147.0);
        assert_eq!(m.mapping(), Mapping::Px1);
    }

    #[test]
    fn bound_parameters_override_defaults() {
        let params = Parameters::new(67.4, 150.0, Mapping::Px1, 1089.0).unwrap();
        let m = Px1Model::with_parameters(params);
        assert_eq!(m.h0(), 67.4);
        assert_eq!(m.rd(), 150.0);
        assert_eq!(m.z_star(), 1089.0);
    }

    #[test]
    fn unsupported_mapping_fails_construction() {
        let src = MapSource(HashMap::from([("mapping", ParamValue::Text("lcdm".into()))]));
        let err = Px1Model::new(src).unwrap_err();
        assert_eq!(err, ModelError::UnsupportedMapping("lcdm".into()));
    }

    #[test]
    fn w_emit_contract() {
        let m = Px1Model::standalone();
        assert_eq!(m.w_emit(0.0).unwrap(), 0.0);
        assert_eq!(m.w_emit(-0.5), Err(ModelError::Domain { z: -0.5 }));
    }

    #[test]
    fn bao_ratios_are_sane_and_increasing() {
        let m = Px1Model::with_parameters(Parameters::default());
        let dm = m.bao_dm_over_rd_many(&BAO_Z).unwrap();
        let dh = m.bao_dh_over_rd_many(&BAO_Z).unwrap();
        for (&z, (&a, &b)) in BAO_Z.iter().zip(dm.iter().zip(dh.iter())) {
            assert!(a.is_finite() && (5.0..50.0).contains(&a), "z={z}: D_M/rd={a}");
            assert!(b.is_finite() && (5.0..50.0).contains(&b), "z={z}: D_H/rd={b}");
        }
        for pair in dm.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn bao_ratios_match_their_definitions() {
        let m = Px1Model::standalone();
        let z = 0.57;
        let dm = m.comoving_angular_distance(z).unwrap();
        let h = m.hubble(z).unwrap();
        assert_eq!(m.bao_dm_over_rd(z).unwrap(), dm / 147.0);
        assert_eq!(m.bao_dh_over_rd(z).unwrap(), (C_KM_S / h) / 147.0);
    }

    #[test]
    fn cmb_acoustic_scale_is_finite_and_positive() {
        let m = Px1Model::with_parameters(Parameters::default());
        let cmb = m.cmb_anchor().unwrap();
        assert_eq!(cmb.z_star, 1090.0);
        assert!(cmb.dm > 0.0 && cmb.dm.is_finite());
        assert_eq!(cmb.da, cmb.dm / 1091.0);
        assert!(cmb.ell_a.is_finite() && cmb.ell_a > 0.0);
        assert!((cmb.ell_a - PI * cmb.da / 147.0).abs() < 1e-9);
        assert_eq!(m.ell_a().unwrap(), cmb.ell_a);
    }

    #[test]
    fn degenerate_hubble_rate_gives_zero_hubble_distance() {
        assert_eq!(hubble_distance_from(f64::INFINITY), 0.0);
        assert_eq!(hubble_distance_from(f64::NAN), 0.0);
        assert_eq!(hubble_distance_from(0.0), 0.0);
        assert_eq!(hubble_distance_from(-3.0), 0.0);

        // A source handing out an infinite H0 drives H(z) to the sentinel.
        let src = MapSource(HashMap::from([("H0", ParamValue::Float(f64::INFINITY))]));
        let m = Px1Model::new(src).unwrap();
        assert_eq!(m.hubble(0.5).unwrap(), f64::INFINITY);
        assert_eq!(m.hubble_distance(0.5).unwrap(), 0.0);
        assert_eq!(m.bao_dh_over_rd(0.5).unwrap(), 0.0);
    }

    #[test]
    fn repeated_observables_are_bit_identical() {
        let m = Px1Model::standalone();
        let zs = [0.1, 0.9, 2.5];
        let first = m.luminosity_distance_many(&zs).unwrap();
        let before = m.cache_stats();
        let second = m.luminosity_distance_many(&zs).unwrap();
        assert_eq!(m.cache_stats(), before);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        assert_eq!(before.dl, 3);
        assert_eq!(before.dm, 3);
    }

    #[test]
    fn many_variants_preserve_order() {
        let m = Px1Model::standalone();
        let zs = [1.5, 0.0, 0.35];
        let da = m.angular_diameter_distance_many(&zs).unwrap();
        assert_eq!(da[1], 0.0);
        assert_eq!(da[0], m.angular_diameter_distance(1.5).unwrap());
        assert_eq!(da[2], m.angular_diameter_distance(0.35).unwrap());
        assert_eq!(m.hubble_many(&zs).unwrap()[1], 70.0);
        assert_eq!(m.expansion_rate_many(&zs).unwrap()[1], 1.0);
        assert_eq!(m.w_emit_many(&zs).unwrap()[1], 0.0);
        assert_eq!(m.hubble_distance_many(&zs).unwrap()[1], C_KM_S / 70.0);
        assert_eq!(m.comoving_angular_distance_many(&zs).unwrap()[1], 0.0);
    }

    #[test]
    fn model_exposes_resolved_parameters_as_a_source() {
        let m = Px1Model::standalone();
        assert_eq!(m.get_param("rd").unwrap().as_f64(), Some(147.0));
        assert_eq!(m.get_param("mapping").unwrap().as_str(), Some("px1"));
    }
}
