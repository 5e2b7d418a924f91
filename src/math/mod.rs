//! Numerical building blocks: grids, bracketed root finding, and adaptive quadrature.

pub mod grid;
pub mod quadrature;
pub mod roots;

pub use grid::*;
pub use quadrature::*;
pub use roots::*;
