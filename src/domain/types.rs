//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - bound to a model instance as its parameter source
//! - loaded from a guardrail JSON record
//! - echoed back into run artifacts

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ModelError;

/// Speed of light in km/s.
pub const C_KM_S: f64 = 299_792.458;

/// Hubble constant used when no parameter source provides one (km/s/Mpc).
pub const DEFAULT_H0: f64 = 70.0;
/// Sound horizon proxy used when no parameter source provides one (Mpc).
pub const DEFAULT_RD: f64 = 147.0;
/// CMB last-scattering redshift used when no parameter source provides one.
pub const DEFAULT_Z_STAR: f64 = 1090.0;
/// Guardrail `z_switch` default. Carried as metadata only.
pub const DEFAULT_Z_SWITCH: f64 = 2.0;

/// Redshift ↔ parametric-variable mapping.
///
/// Only PX1 exists today; the enum keeps the mapping explicit in parameter
/// records and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mapping {
    /// `(1 + z) = sec²(w) · exp(tan w)`.
    #[default]
    Px1,
}

impl Mapping {
    pub fn as_str(self) -> &'static str {
        match self {
            Mapping::Px1 => "px1",
        }
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mapping {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "px1" => Ok(Mapping::Px1),
            _ => Err(ModelError::UnsupportedMapping(s.to_string())),
        }
    }
}

/// A value handed out by a [`ParameterSource`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::Float(_) => None,
        }
    }
}

/// Why a parameter lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("unknown parameter '{0}'")]
    Unknown(String),
    #[error("parameter '{0}' is not available")]
    Unavailable(String),
}

/// The one capability the model needs from its host: named parameter lookup.
///
/// Recognized names are `H0`, `rd`, `mapping`, and `z_star`. The model never
/// relies on a lookup succeeding; failures fall back to documented defaults.
pub trait ParameterSource {
    fn get_param(&self, name: &str) -> Result<ParamValue, ParamError>;
}

/// Immutable cosmological parameters for one model instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Hubble constant (km/s/Mpc).
    #[serde(rename = "H0")]
    pub h0: f64,
    /// Comoving sound horizon (Mpc).
    pub rd: f64,
    pub mapping: Mapping,
    /// CMB anchor redshift.
    pub z_star: f64,
}

impl Parameters {
    /// Build validated parameters. `h0`, `rd`, and `z_star` must be finite and positive.
    pub fn new(h0: f64, rd: f64, mapping: Mapping, z_star: f64) -> Result<Self, ModelError> {
        for (name, value) in [("H0", h0), ("rd", rd), ("z_star", z_star)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ModelError::InvalidParameter { name, value });
            }
        }
        Ok(Self {
            h0,
            rd,
            mapping,
            z_star,
        })
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            h0: DEFAULT_H0,
            rd: DEFAULT_RD,
            mapping: Mapping::Px1,
            z_star: DEFAULT_Z_STAR,
        }
    }
}

impl ParameterSource for Parameters {
    fn get_param(&self, name: &str) -> Result<ParamValue, ParamError> {
        match name {
            "H0" => Ok(ParamValue::Float(self.h0)),
            "rd" => Ok(ParamValue::Float(self.rd)),
            "mapping" => Ok(ParamValue::Text(self.mapping.as_str().to_string())),
            "z_star" => Ok(ParamValue::Float(self.z_star)),
            other => Err(ParamError::Unknown(other.to_string())),
        }
    }
}

/// External guardrail record fixing canonical parameter values across runs.
///
/// Every field is optional in the JSON; missing fields take the documented
/// defaults. Unrecognized fields are kept so they survive into artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guardrail {
    #[serde(rename = "H0", default = "default_h0")]
    pub h0: f64,
    #[serde(rename = "rs_proxy_Mpc", default = "default_rd")]
    pub rs_proxy_mpc: f64,
    #[serde(default = "default_mapping")]
    pub mapping: String,
    #[serde(default = "default_z_switch")]
    pub z_switch: f64,
    #[serde(default = "default_z_star")]
    pub z_star: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_h0() -> f64 {
    DEFAULT_H0
}

fn default_rd() -> f64 {
    DEFAULT_RD
}

fn default_mapping() -> String {
    Mapping::Px1.as_str().to_string()
}

fn default_z_switch() -> f64 {
    DEFAULT_Z_SWITCH
}

fn default_z_star() -> f64 {
    DEFAULT_Z_STAR
}

impl Default for Guardrail {
    fn default() -> Self {
        Self {
            h0: DEFAULT_H0,
            rs_proxy_mpc: DEFAULT_RD,
            mapping: default_mapping(),
            z_switch: DEFAULT_Z_SWITCH,
            z_star: DEFAULT_Z_STAR,
            extra: serde_json::Map::new(),
        }
    }
}

impl Guardrail {
    /// Convert the guardrail into validated model parameters (`rd = rs_proxy_Mpc`).
    pub fn parameters(&self) -> Result<Parameters, ModelError> {
        let mapping = self.mapping.parse::<Mapping>()?;
        Parameters::new(self.h0, self.rs_proxy_mpc, mapping, self.z_star)
    }
}
