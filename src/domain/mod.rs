//! Domain types used throughout the model and driver.
//!
//! This module defines:
//!
//! - physical constants and parameter defaults
//! - the parameter-source capability (`ParameterSource`, `ParamValue`)
//! - validated model parameters (`Parameters`, `Mapping`)
//! - the external guardrail record (`Guardrail`)

pub mod types;

pub use types::*;
