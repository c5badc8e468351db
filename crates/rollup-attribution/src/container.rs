//! Investment containers: the source of position records and atom leaves.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use rollup_core::types::AGGREGATE_INTERVAL_NAME;
use rollup_core::{CashflowSet, Table};
use rollup_math::IrrConfig;
use rollup_performance::PerformanceResult;

use crate::config::EngineConfig;
use crate::error::AttributionResult;

/// Atom id to precomputed leaf result.
pub type AtomResults = BTreeMap<String, Arc<PerformanceResult>>;

/// Supplies one investment's records and atom-level leaves.
///
/// The tree builder never computes atom leaves itself; it always asks the
/// owning container.
pub trait InvestmentContainer: fmt::Debug + Send + Sync {
    /// Investment name.
    fn name(&self) -> &str;

    /// Position-level cashflows.
    fn position_cashflows(&self) -> &CashflowSet;

    /// Position dimension table (one row per atom, attribute columns).
    fn position_dimn(&self) -> &Table;

    /// Leaf results per atom for one aggregation interval.
    ///
    /// Intervals without cashflows yield an empty map.
    fn atom_level_performance_results(&self, interval: &str) -> AttributionResult<Arc<AtomResults>>;
}

/// A container backed by in-memory tables.
///
/// The cashflow table carries the atom id column next to the standard
/// cashflow columns. Atom leaves for every interval are built on first
/// request and kept for the container's lifetime.
#[derive(Debug)]
pub struct InMemoryInvestment {
    name: String,
    cashflow_table: Table,
    cashflows: CashflowSet,
    dimn: Table,
    atom_id_column: String,
    irr_config: IrrConfig,
    atoms: OnceCell<BTreeMap<String, Arc<AtomResults>>>,
}

impl InMemoryInvestment {
    /// Creates a container after validating both tables.
    ///
    /// # Errors
    ///
    /// Schema, domain or parse errors from the cashflow table, or a missing
    /// atom id column in either table.
    pub fn new(
        name: impl Into<String>,
        cashflow_table: Table,
        dimn: Table,
        config: &EngineConfig,
    ) -> AttributionResult<Self> {
        cashflow_table.require_columns(&[config.atom_id_column.as_str()])?;
        dimn.require_columns(&[config.atom_id_column.as_str()])?;
        let cashflows = CashflowSet::from_table(&cashflow_table)?;

        Ok(Self {
            name: name.into(),
            cashflow_table,
            cashflows,
            dimn,
            atom_id_column: config.atom_id_column.clone(),
            irr_config: config.irr,
            atoms: OnceCell::new(),
        })
    }

    /// Loads both tables from CSV files.
    pub fn from_csv_paths(
        name: impl Into<String>,
        cashflows: impl AsRef<std::path::Path>,
        dimn: impl AsRef<std::path::Path>,
        config: &EngineConfig,
    ) -> AttributionResult<Self> {
        let name = name.into();
        let cashflow_table = Table::from_csv_path(format!("{name} cashflows"), cashflows)?;
        let dimn = Table::from_csv_path(format!("{name} positions"), dimn)?;
        Self::new(name, cashflow_table, dimn, config)
    }

    fn build_atoms(&self) -> AttributionResult<BTreeMap<String, Arc<AtomResults>>> {
        let mut by_interval = BTreeMap::new();
        for (interval, rows) in self.cashflow_table.group_by(AGGREGATE_INTERVAL_NAME)? {
            let mut atoms = AtomResults::new();
            for (atom, atom_rows) in rows.group_by(&self.atom_id_column)? {
                let set = CashflowSet::from_table(&atom_rows)?;
                let currencies = set.currencies();
                if currencies.len() > 1 {
                    // Amounts are summed as booked; there is no FX conversion.
                    warn!(
                        investment = %self.name,
                        atom = %atom,
                        currencies = ?currencies,
                        "atom mixes currencies"
                    );
                }
                let leaf = PerformanceResult::new(set, &interval).with_irr_config(self.irr_config);
                atoms.insert(atom, Arc::new(leaf));
            }
            debug!(
                investment = %self.name,
                interval = %interval,
                atoms = atoms.len(),
                "built atom leaves"
            );
            by_interval.insert(interval, Arc::new(atoms));
        }
        Ok(by_interval)
    }
}

impl InvestmentContainer for InMemoryInvestment {
    fn name(&self) -> &str {
        &self.name
    }

    fn position_cashflows(&self) -> &CashflowSet {
        &self.cashflows
    }

    fn position_dimn(&self) -> &Table {
        &self.dimn
    }

    fn atom_level_performance_results(
        &self,
        interval: &str,
    ) -> AttributionResult<Arc<AtomResults>> {
        let atoms = self.atoms.get_or_try_init(|| self.build_atoms())?;
        Ok(atoms.get(interval).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollup_core::types::REQUIRED_CASHFLOW_COLUMNS;
    use rollup_performance::Performance;
    use rust_decimal_macros::dec;

    fn cashflow_columns() -> Vec<&'static str> {
        let mut cols = REQUIRED_CASHFLOW_COLUMNS.to_vec();
        cols.push("PositionId");
        cols
    }

    fn investment() -> InMemoryInvestment {
        let cashflows = Table::from_str_rows(
            "cf",
            &cashflow_columns(),
            &[
                &["2020-01-01", "T", "USD", "-100", "2024-12-31", "ITD", "Base", "P1"],
                &["2024-12-31", "R", "USD", "130", "2024-12-31", "ITD", "Base", "P1"],
                &["2021-01-01", "T", "USD", "-50", "2024-12-31", "ITD", "Base", "P2"],
                &["2024-12-31", "R", "USD", "40", "2024-12-31", "ITD", "Base", "P2"],
                &["2024-01-01", "T", "USD", "-10", "2024-12-31", "YTD", "Base", "P2"],
            ],
        )
        .unwrap();
        let dimn = Table::from_str_rows(
            "dimn",
            &["PositionId", "Sector"],
            &[&["P1", "Tech"], &["P2", "Health"]],
        )
        .unwrap();
        InMemoryInvestment::new("Fund I", cashflows, dimn, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_atoms_per_interval() {
        let inv = investment();
        let itd = inv.atom_level_performance_results("ITD").unwrap();
        assert_eq!(itd.len(), 2);
        assert_eq!(itd["P1"].pnl(), dec!(30));
        assert_eq!(itd["P2"].cost(), dec!(-50));

        let ytd = inv.atom_level_performance_results("YTD").unwrap();
        assert_eq!(ytd.len(), 1);
        assert_eq!(ytd["P2"].interval(), "YTD");

        assert!(inv.atom_level_performance_results("QTD").unwrap().is_empty());
    }

    #[test]
    fn test_atoms_are_memoized() {
        let inv = investment();
        let first = inv.atom_level_performance_results("ITD").unwrap();
        let second = inv.atom_level_performance_results("ITD").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_atom_column() {
        let cashflows = Table::from_str_rows(
            "cf",
            &REQUIRED_CASHFLOW_COLUMNS,
            &[&["2020-01-01", "T", "USD", "-100", "2024-12-31", "ITD", "Base"]],
        )
        .unwrap();
        let dimn = Table::from_str_rows("dimn", &["PositionId"], &[&["P1"]]).unwrap();
        assert!(InMemoryInvestment::new("X", cashflows, dimn, &EngineConfig::default()).is_err());
    }

    #[test]
    fn test_mixed_currency_atom_sums_as_booked() {
        let cashflows = Table::from_str_rows(
            "cf",
            &cashflow_columns(),
            &[
                &["2020-01-01", "T", "USD", "-100", "2024-12-31", "ITD", "Base", "P1"],
                &["2024-12-31", "R", "EUR", "90", "2024-12-31", "ITD", "Base", "P1"],
            ],
        )
        .unwrap();
        let dimn = Table::from_str_rows("dimn", &["PositionId"], &[&["P1"]]).unwrap();
        let inv = InMemoryInvestment::new("Fund X", cashflows, dimn, &EngineConfig::default())
            .unwrap();

        let itd = inv.atom_level_performance_results("ITD").unwrap();
        assert_eq!(itd["P1"].cashflows().currencies().len(), 2);
        assert_eq!(itd["P1"].pnl(), dec!(-10));
    }

    #[test]
    fn test_position_cashflows() {
        let inv = investment();
        assert_eq!(inv.position_cashflows().len(), 5);
        assert_eq!(inv.position_dimn().len(), 2);
        assert_eq!(inv.name(), "Fund I");
    }
}
