//! Reporting utilities: console summaries and observable tables.

pub mod format;

pub use format::*;
