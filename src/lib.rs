//! `px1-cosmology` library crate.
//!
//! The binary (`px1`) is a thin wrapper around this library so that:
//!
//! - the model core is testable without spawning processes
//! - the model is reusable from other drivers (notebooks, samplers, etc.)
//! - file I/O stays in the outer layers (`io`, `app`); `models` and `math` do none

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
