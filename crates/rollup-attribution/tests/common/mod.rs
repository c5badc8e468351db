//! Shared fixtures for attribution integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rollup_attribution::prelude::*;
use rollup_core::types::REQUIRED_CASHFLOW_COLUMNS;
use rollup_core::Table;

/// One atom's attributes and base items (whole currency units).
#[derive(Debug, Clone)]
pub struct Atom {
    pub id: String,
    pub bucket: String,
    pub sector: String,
    pub status: String,
    pub cost: i64,
    pub distributions: i64,
    pub nav: i64,
}

impl Atom {
    pub fn new(
        id: &str,
        bucket: &str,
        sector: &str,
        status: &str,
        cost: i64,
        distributions: i64,
        nav: i64,
    ) -> Self {
        Self {
            id: id.to_string(),
            bucket: bucket.to_string(),
            sector: sector.to_string(),
            status: status.to_string(),
            cost,
            distributions,
            nav,
        }
    }

    pub fn pnl(&self) -> i64 {
        -self.cost.abs() + self.distributions + self.nav
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An in-memory investment: takedown on 2020-01-01, distribution on
/// 2022-06-30 when non-zero, residual value on 2024-12-31.
pub fn investment(
    name: &str,
    manager: Option<&str>,
    atoms: &[Atom],
    config: &EngineConfig,
) -> Arc<dyn InvestmentContainer> {
    let mut cf_columns: Vec<String> = REQUIRED_CASHFLOW_COLUMNS
        .iter()
        .map(|c| (*c).to_string())
        .collect();
    cf_columns.push("PositionId".to_string());
    let mut cashflows = Table::new(format!("{name} cashflows"), cf_columns).unwrap();

    let mut dimn_columns = vec![
        "PositionId".to_string(),
        "Bucket".to_string(),
        "Sector".to_string(),
        "RealizationStatus".to_string(),
    ];
    if manager.is_some() {
        dimn_columns.push("ManagerName".to_string());
    }
    let mut dimn = Table::new(format!("{name} positions"), dimn_columns).unwrap();

    let row = |date: &str, kind: &str, amount: i64, interval: &str, atom: &str| {
        vec![
            date.to_string(),
            kind.to_string(),
            "USD".to_string(),
            amount.to_string(),
            "2024-12-31".to_string(),
            interval.to_string(),
            "Base".to_string(),
            atom.to_string(),
        ]
    };

    for atom in atoms {
        cashflows
            .push_row(row("2020-01-01", "T", -atom.cost.abs(), "ITD", &atom.id))
            .unwrap();
        if atom.distributions != 0 {
            cashflows
                .push_row(row("2022-06-30", "D", atom.distributions, "ITD", &atom.id))
                .unwrap();
        }
        cashflows
            .push_row(row("2024-12-31", "R", atom.nav, "ITD", &atom.id))
            .unwrap();
        // A year-to-date leg the ITD trees must ignore.
        cashflows
            .push_row(row("2024-03-01", "T", -5, "YTD", &atom.id))
            .unwrap();

        let mut cells = vec![
            atom.id.clone(),
            atom.bucket.clone(),
            atom.sector.clone(),
            atom.status.clone(),
        ];
        if let Some(m) = manager {
            cells.push(m.to_string());
        }
        dimn.push_row(cells).unwrap();
    }

    Arc::new(InMemoryInvestment::new(name, cashflows, dimn, config).unwrap())
}

/// A(-100, +50), B(-200, -20) in Fund I; C(-50, +30), D(-80, +40),
/// E(-30, total loss) in Fund II. A, B and C sit in bucket "X".
pub fn fund_one_atoms() -> Vec<Atom> {
    vec![
        Atom::new("A", "X", "Tech", "Realized", 100, 60, 90),
        Atom::new("B", "X", "Health", "Unrealized", 200, 0, 180),
    ]
}

pub fn fund_two_atoms() -> Vec<Atom> {
    vec![
        Atom::new("C", "X", "Tech", "Unrealized", 50, 80, 0),
        Atom::new("D", "Y", "Energy", "Realized", 80, 20, 100),
        Atom::new("E", "Y", "Energy", "Written Off", 30, 0, 0),
    ]
}

/// Atom held by both funds.
pub fn shared_atom(nav: i64) -> Atom {
    Atom::new("S", "X", "Tech", "Unrealized", 10, 0, nav)
}

pub fn builder_with(config: EngineConfig, shared: bool) -> AttributionTreeBuilder {
    let mut one = fund_one_atoms();
    let mut two = fund_two_atoms();
    if shared {
        one.push(shared_atom(12));
        two.push(shared_atom(8));
    }
    let containers = vec![
        investment("Fund I", Some("Acme Capital"), &one, &config),
        investment("Fund II", None, &two, &config),
    ];
    let managers = ManagerDirectory::new(config.manager_column.clone());
    AttributionTreeBuilder::new(config, containers, managers).unwrap()
}

pub fn builder() -> AttributionTreeBuilder {
    builder_with(EngineConfig::default(), false)
}

pub fn tree_by(attributes: &[&str]) -> AttributionTree {
    let mut b = builder();
    b.build_from_config(attributes).unwrap()
}
