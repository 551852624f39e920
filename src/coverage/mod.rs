//! Coverage matrix.
//!
//! Consolidates each expert's criterion → objective assignment by strict
//! majority vote, then derives:
//!
//! - per-criterion **representativeness flags** (a hard selection veto for
//!   criteria mapped to no objective), and
//! - per-objective **target coverage** and **deficit bound**
//!   `D = max(1, target − U)`.

mod builder;

pub use builder::{CoverageBuilder, CoverageMatrix, Objective};
