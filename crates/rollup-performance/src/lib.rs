//! # Rollup Performance
//!
//! Private-market performance measures for the Rollup engine.
//!
//! - [`PerformanceResult`]: measures of one cashflow set, memoized per instance
//! - [`AggregatedPerformanceResult`]: named composition of leaves and aggregates
//! - [`Performance`]: the shared measure surface, including derived multiples
//! - [`Measure`], [`MeasureRow`], [`MeasureTable`]: row-shaped output
//!
//! ## Zero-cost policy
//!
//! Ratios with a zero denominator (`moic`, `tvpi`, `dpi`, `rvpi`,
//! `loss_ratio`) are `NaN` at every level. Use
//! [`Performance::checked_measure`] to get `PerformanceError::UndefinedRatio`
//! instead.
//!
//! ## Example
//!
//! ```rust
//! use rollup_core::{CashflowKind, CashflowRecord, CashflowSet, Date};
//! use rollup_performance::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let as_of = Date::from_ymd(2024, 12, 31).unwrap();
//! let leaf = |cost, nav| {
//!     PerformanceResult::new(
//!         CashflowSet::new(vec![
//!             CashflowRecord::new(
//!                 Date::from_ymd(2021, 3, 1).unwrap(),
//!                 CashflowKind::Takedown,
//!                 cost,
//!                 as_of,
//!             ),
//!             CashflowRecord::new(as_of, CashflowKind::ResidualValue, nav, as_of),
//!         ]),
//!         "ITD",
//!     )
//! };
//!
//! let fund = AggregatedPerformanceResult::new(
//!     "Fund",
//!     vec![("A", leaf(dec!(-100), dec!(150))), ("B", leaf(dec!(-50), dec!(40)))],
//! )
//! .unwrap();
//!
//! assert_eq!(fund.pnl(), dec!(40));
//! assert_eq!(fund.full_expanded_count(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]

pub mod aggregate;
pub mod error;
pub mod measure;
pub mod performance;
pub mod result;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::aggregate::{AggregatedPerformanceResult, PerformanceNode};
    pub use crate::error::{PerfResult, PerformanceError};
    pub use crate::measure::{Measure, MeasureRow, MeasureTable, MeasureValue, NAME_COLUMN};
    pub use crate::performance::Performance;
    pub use crate::result::PerformanceResult;
}

pub use aggregate::{AggregatedPerformanceResult, PerformanceNode};
pub use error::{PerfResult, PerformanceError};
pub use measure::{Measure, MeasureRow, MeasureTable, MeasureValue};
pub use performance::Performance;
pub use result::PerformanceResult;
