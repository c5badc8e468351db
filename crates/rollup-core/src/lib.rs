//! # Rollup Core
//!
//! Core record types for the Rollup performance engine.
//!
//! This crate provides the building blocks the performance and attribution
//! crates consume:
//!
//! - **Tables**: String-typed tabular record sets with schema checks and
//!   deterministic group-by
//! - **Cashflows**: Typed cash movements and the validated [`CashflowSet`]
//! - **Errors**: Schema, domain, and parse failures
//!
//! ## Example
//!
//! ```rust
//! use rollup_core::prelude::*;
//!
//! let table = Table::from_str_rows(
//!     "cashflows",
//!     &REQUIRED_CASHFLOW_COLUMNS,
//!     &[&["2020-01-15", "T", "USD", "-100", "2024-12-31", "ITD", "Base"]],
//! )
//! .unwrap();
//! let set = CashflowSet::from_table(&table).unwrap();
//! assert_eq!(set.filter_by_kind(CashflowKind::Takedown).len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::return_self_not_must_use)]

pub mod error;
pub mod table;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::table::Table;
    pub use crate::types::{
        CashflowKind, CashflowRecord, CashflowSet, Date, REQUIRED_CASHFLOW_COLUMNS,
    };
}

pub use error::{CoreError, CoreResult};
pub use table::Table;
pub use types::{CashflowKind, CashflowRecord, CashflowSet, Date};
