//! route-optimizer core
//!
//! Orders a small set of named destinations into a closed tour using a
//! distance-matrix provider and a pluggable route finder.

pub mod traits;
pub mod matrix;
pub mod google;
pub mod solver;
pub mod optimizer;
pub mod error;
