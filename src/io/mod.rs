//! Input/output helpers.
//!
//! - guardrail JSON read (`guardrail`)
//! - quickstart artifact JSON write/read (`artifact`)

pub mod artifact;
pub mod guardrail;

pub use artifact::*;
pub use guardrail::*;
