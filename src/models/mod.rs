//! PX1 model core.
//!
//! Components are layered leaf-first so each can be tested on its own:
//!
//! - `inversion`: z → w (bracketed root solve)
//! - `expansion`: z → E(z), H(z)
//! - `distance`: z → D_M, D_L, D_A (adaptive quadrature of 1/E)
//! - `observables`: `Px1Model`, the parameterized facade (BAO, CMB)
//! - `cache`: quantized-key memo tables shared by all of the above

pub mod cache;
pub mod distance;
pub mod expansion;
pub mod inversion;
pub mod observables;

pub use distance::*;
pub use expansion::*;
pub use inversion::*;
pub use observables::*;
