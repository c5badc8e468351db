//! # Rollup Attribution
//!
//! Attribution trees over a portfolio of investments.
//!
//! Each [`InvestmentContainer`] supplies position records and precomputed
//! atom-level results. The [`AttributionTreeBuilder`] merges the records of
//! every container, groups them recursively on an ordered attribute list and
//! aggregates bottom-up into [`ReportingLayer`]s. Views derived from a layer:
//!
//! - [`ConcentrationExtractor`]: top-N atoms by P&L and the 1-3-5 breakdown
//! - [`RealizationBucketMatcher`]: realized / unrealized buckets
//! - [`ReportKind`]: labeled measure rows for output
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rollup_attribution::prelude::*;
//! use rollup_core::Table;
//! use rollup_performance::Performance;
//! use rust_decimal_macros::dec;
//!
//! let config = EngineConfig::default();
//! let cashflows = Table::from_str_rows(
//!     "cashflows",
//!     &[
//!         "CashflowDate", "CashflowType", "Currency", "Amount", "AsOfDate",
//!         "AggregateIntervalName", "ScenarioName", "PositionId",
//!     ],
//!     &[
//!         &["2021-01-01", "T", "USD", "-100", "2024-12-31", "ITD", "Base", "P1"],
//!         &["2024-12-31", "R", "USD", "150", "2024-12-31", "ITD", "Base", "P1"],
//!         &["2022-01-01", "T", "USD", "-50", "2024-12-31", "ITD", "Base", "P2"],
//!         &["2024-12-31", "R", "USD", "40", "2024-12-31", "ITD", "Base", "P2"],
//!     ],
//! )
//! .unwrap();
//! let positions = Table::from_str_rows(
//!     "positions",
//!     &["PositionId", "Sector"],
//!     &[&["P1", "Tech"], &["P2", "Health"]],
//! )
//! .unwrap();
//!
//! let fund: Arc<dyn InvestmentContainer> =
//!     Arc::new(InMemoryInvestment::new("Fund I", cashflows, positions, &config).unwrap());
//! let mut builder = AttributionTreeBuilder::new(
//!     config,
//!     vec![fund],
//!     ManagerDirectory::new("ManagerName"),
//! )
//! .unwrap();
//!
//! let tree = builder.build_from_config(&["Sector"]).unwrap();
//! let root = tree.root();
//! assert_eq!(root.name(), "Total");
//! assert_eq!(root.pnl(), dec!(40));
//! assert_eq!(root.child("Sector - Tech").unwrap().pnl(), dec!(50));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod concentration;
pub mod config;
pub mod container;
pub mod error;
pub mod layer;
pub mod manager;
pub mod realization;
pub mod report;
pub mod tree;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::concentration::{Breakdown, ConcentrationExtractor, RankOrder, TopN};
    pub use crate::config::{AtomConflictPolicy, EngineConfig, RealizationBucket, RealizationConfig};
    pub use crate::container::{AtomResults, InMemoryInvestment, InvestmentContainer};
    pub use crate::error::{AttributionError, AttributionResult};
    pub use crate::layer::ReportingLayer;
    pub use crate::manager::{ManagerDirectory, ManagerInfo};
    pub use crate::realization::{RealizationBucketMatcher, RealizationSplit};
    pub use crate::report::ReportKind;
    pub use crate::tree::{AttributionTree, AttributionTreeBuilder, BuildSummary};
}

pub use concentration::{ConcentrationExtractor, RankOrder};
pub use config::{AtomConflictPolicy, EngineConfig};
pub use container::{InMemoryInvestment, InvestmentContainer};
pub use error::{AttributionError, AttributionResult};
pub use layer::ReportingLayer;
pub use manager::ManagerDirectory;
pub use realization::RealizationBucketMatcher;
pub use report::ReportKind;
pub use tree::{AttributionTree, AttributionTreeBuilder};
