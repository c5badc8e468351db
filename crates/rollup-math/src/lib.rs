//! # Rollup Math
//!
//! Numerical routines for the Rollup performance engine.
//!
//! This crate provides:
//!
//! - **Solvers**: Root-finding algorithms (Brent, and a Newton-Raphson hybrid)
//! - **IRR**: Money-weighted return over irregularly dated cashflows
//!
//! Everything here works on `f64`; money stays in `Decimal` upstream and is
//! converted only at the solver boundary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]

pub mod error;
pub mod irr;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::irr::{npv, xirr, IrrConfig};
    pub use crate::solvers::{brent, find_bracket, hybrid, SolverConfig, SolverResult};
}

pub use error::{MathError, MathResult};
pub use irr::{xirr, IrrConfig};
