//! Domain types for cashflow records.
//!
//! - [`Date`]: Calendar date on a record
//! - [`CashflowKind`]: Takedown / Distribution / ResidualValue / Other
//! - [`CashflowRecord`]: One dated cash movement
//! - [`CashflowSet`]: Validated, immutable collection of movements

mod cashflow;
mod date;

pub use cashflow::{
    CashflowKind, CashflowRecord, CashflowSet, AGGREGATE_INTERVAL_NAME, AMOUNT, AS_OF_DATE,
    CASHFLOW_DATE, CASHFLOW_TYPE, CURRENCY, REQUIRED_CASHFLOW_COLUMNS, SCENARIO_NAME,
};
pub use date::Date;
