//! Cash movements and validated cashflow sets.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Date;
use crate::error::{CoreError, CoreResult};
use crate::table::Table;

/// Column holding the payment date.
pub const CASHFLOW_DATE: &str = "CashflowDate";
/// Column holding the cashflow type code.
pub const CASHFLOW_TYPE: &str = "CashflowType";
/// Column holding the currency code.
pub const CURRENCY: &str = "Currency";
/// Column holding the signed amount.
pub const AMOUNT: &str = "Amount";
/// Column holding the as-of date of the extract.
pub const AS_OF_DATE: &str = "AsOfDate";
/// Column holding the aggregation interval tag (e.g. "ITD", "YTD").
pub const AGGREGATE_INTERVAL_NAME: &str = "AggregateIntervalName";
/// Column holding the scenario tag.
pub const SCENARIO_NAME: &str = "ScenarioName";

/// Columns every cashflow table must carry.
pub const REQUIRED_CASHFLOW_COLUMNS: [&str; 7] = [
    CASHFLOW_DATE,
    CASHFLOW_TYPE,
    CURRENCY,
    AMOUNT,
    AS_OF_DATE,
    AGGREGATE_INTERVAL_NAME,
    SCENARIO_NAME,
];

/// Classification of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CashflowKind {
    /// Capital drawn into the investment (code `T`).
    Takedown,
    /// Capital returned to the investor (code `D`).
    Distribution,
    /// Residual (unrealized) value at the as-of date (code `R`).
    ResidualValue,
    /// Any other movement: fees, expenses, adjustments.
    Other,
}

impl CashflowKind {
    /// All kinds, in partition order.
    pub const ALL: [CashflowKind; 4] = [
        CashflowKind::Takedown,
        CashflowKind::Distribution,
        CashflowKind::ResidualValue,
        CashflowKind::Other,
    ];

    /// The code used in the `CashflowType` column.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            CashflowKind::Takedown => "T",
            CashflowKind::Distribution => "D",
            CashflowKind::ResidualValue => "R",
            CashflowKind::Other => "Other",
        }
    }
}

impl fmt::Display for CashflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for CashflowKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "T" => Ok(CashflowKind::Takedown),
            "D" => Ok(CashflowKind::Distribution),
            "R" => Ok(CashflowKind::ResidualValue),
            "Other" => Ok(CashflowKind::Other),
            other => Err(CoreError::invalid_domain_value("cashflow type", other, 0)),
        }
    }
}

/// One cash movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashflowRecord {
    /// Payment date.
    pub date: Date,
    /// Movement classification.
    pub kind: CashflowKind,
    /// Currency code.
    pub currency: String,
    /// Signed amount; takedowns are normally negative.
    pub amount: Decimal,
    /// As-of date of the extract this record came from.
    pub as_of_date: Date,
    /// Aggregation interval tag.
    pub aggregate_interval_name: String,
    /// Scenario tag.
    pub scenario_name: String,
}

impl CashflowRecord {
    /// Creates a record with empty interval and scenario tags.
    #[must_use]
    pub fn new(date: Date, kind: CashflowKind, amount: Decimal, as_of_date: Date) -> Self {
        Self {
            date,
            kind,
            currency: "USD".to_string(),
            amount,
            as_of_date,
            aggregate_interval_name: String::new(),
            scenario_name: String::new(),
        }
    }

    /// Sets the currency code.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Sets the aggregation interval tag.
    #[must_use]
    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.aggregate_interval_name = interval.into();
        self
    }

    /// Sets the scenario tag.
    #[must_use]
    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario_name = scenario.into();
        self
    }
}

/// An immutable, validated collection of cash movements.
///
/// # Example
///
/// ```rust
/// use rollup_core::types::{CashflowKind, CashflowRecord, CashflowSet, Date};
/// use rust_decimal_macros::dec;
///
/// let as_of = Date::from_ymd(2024, 12, 31).unwrap();
/// let set = CashflowSet::new(vec![
///     CashflowRecord::new(
///         Date::from_ymd(2020, 1, 1).unwrap(),
///         CashflowKind::Takedown,
///         dec!(-100),
///         as_of,
///     ),
///     CashflowRecord::new(as_of, CashflowKind::ResidualValue, dec!(140), as_of),
/// ]);
/// let takedowns = set.filter_by_kind(CashflowKind::Takedown);
/// assert_eq!(CashflowSet::sum(&takedowns), dec!(-100));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashflowSet {
    records: Vec<CashflowRecord>,
}

impl CashflowSet {
    /// Wraps already-typed records.
    #[must_use]
    pub fn new(records: Vec<CashflowRecord>) -> Self {
        Self { records }
    }

    /// Checks a raw cashflow table.
    ///
    /// # Errors
    ///
    /// - `CoreError::MissingColumn` if a required column is absent
    /// - `CoreError::InvalidDomainValue` if a `CashflowType` is not T/D/R/Other
    pub fn validate(table: &Table) -> CoreResult<()> {
        table.require_columns(&REQUIRED_CASHFLOW_COLUMNS)?;
        for (row, value) in table.column_values(CASHFLOW_TYPE)?.enumerate() {
            value
                .parse::<CashflowKind>()
                .map_err(|_| CoreError::invalid_domain_value("cashflow type", value, row))?;
        }
        Ok(())
    }

    /// Validates and converts a raw cashflow table.
    ///
    /// # Errors
    ///
    /// Everything [`CashflowSet::validate`] reports, plus `CoreError::Parse`
    /// for unreadable dates or amounts.
    pub fn from_table(table: &Table) -> CoreResult<Self> {
        Self::validate(table)?;

        let date_idx = table.column_index(CASHFLOW_DATE)?;
        let kind_idx = table.column_index(CASHFLOW_TYPE)?;
        let currency_idx = table.column_index(CURRENCY)?;
        let amount_idx = table.column_index(AMOUNT)?;
        let as_of_idx = table.column_index(AS_OF_DATE)?;
        let interval_idx = table.column_index(AGGREGATE_INTERVAL_NAME)?;
        let scenario_idx = table.column_index(SCENARIO_NAME)?;

        let records = table
            .rows()
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                Ok(CashflowRecord {
                    date: parse_date(CASHFLOW_DATE, &cells[date_idx], row)?,
                    kind: cells[kind_idx].parse().map_err(|_| {
                        CoreError::invalid_domain_value("cashflow type", &cells[kind_idx], row)
                    })?,
                    currency: cells[currency_idx].clone(),
                    amount: parse_amount(&cells[amount_idx], row)?,
                    as_of_date: parse_date(AS_OF_DATE, &cells[as_of_idx], row)?,
                    aggregate_interval_name: cells[interval_idx].clone(),
                    scenario_name: cells[scenario_idx].clone(),
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self { records })
    }

    /// The records, in input order.
    #[must_use]
    pub fn records(&self) -> &[CashflowRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of one kind. No side effects on `self`.
    #[must_use]
    pub fn filter_by_kind(&self, kind: CashflowKind) -> CashflowSet {
        self.filter(|r| r.kind == kind)
    }

    /// Records matching `predicate`.
    #[must_use]
    pub fn filter<F>(&self, predicate: F) -> CashflowSet
    where
        F: Fn(&CashflowRecord) -> bool,
    {
        CashflowSet {
            records: self.records.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }

    /// Sum of amounts over a subset; zero when empty.
    #[must_use]
    pub fn sum(subset: &CashflowSet) -> Decimal {
        subset.records.iter().map(|r| r.amount).sum()
    }

    /// Sum of amounts of one kind.
    #[must_use]
    pub fn sum_of(&self, kind: CashflowKind) -> Decimal {
        self.records
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.amount)
            .sum()
    }

    /// Sum of every amount.
    #[must_use]
    pub fn total(&self) -> Decimal {
        Self::sum(self)
    }

    /// (date, amount) pairs in input order.
    #[must_use]
    pub fn dated_amounts(&self) -> Vec<(Date, Decimal)> {
        self.records.iter().map(|r| (r.date, r.amount)).collect()
    }

    /// Distinct currency codes present.
    #[must_use]
    pub fn currencies(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.currency.as_str()).collect()
    }
}

impl FromIterator<CashflowRecord> for CashflowSet {
    fn from_iter<I: IntoIterator<Item = CashflowRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

fn parse_date(column: &str, value: &str, row: usize) -> CoreResult<Date> {
    Date::parse(value).map_err(|e| CoreError::parse(column, value, row, e.to_string()))
}

fn parse_amount(value: &str, row: usize) -> CoreResult<Decimal> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|e| CoreError::parse(AMOUNT, value, row, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw_table(rows: &[&[&str]]) -> Table {
        Table::from_str_rows("cashflows", &REQUIRED_CASHFLOW_COLUMNS, rows).unwrap()
    }

    fn sample() -> Table {
        raw_table(&[
            &["2020-01-15", "T", "USD", "-100", "2024-12-31", "ITD", "Base"],
            &["2021-06-30", "D", "USD", "30", "2024-12-31", "ITD", "Base"],
            &["2024-12-31", "R", "USD", "95.5", "2024-12-31", "ITD", "Base"],
            &["2022-03-31", "Other", "USD", "-2.25", "2024-12-31", "ITD", "Base"],
        ])
    }

    #[test]
    fn test_kind_codes_round_trip() {
        for kind in CashflowKind::ALL {
            assert_eq!(kind.code().parse::<CashflowKind>().unwrap(), kind);
        }
        assert!("X".parse::<CashflowKind>().is_err());
        assert!("t".parse::<CashflowKind>().is_err());
    }

    #[test]
    fn test_validate_missing_column() {
        let table = Table::from_str_rows(
            "cashflows",
            &["CashflowDate", "CashflowType", "Currency", "Amount", "AsOfDate", "ScenarioName"],
            &[],
        )
        .unwrap();
        let err = CashflowSet::validate(&table).unwrap_err();
        assert!(err.is_schema_error());
        assert!(err.to_string().contains("AggregateIntervalName"));
    }

    #[test]
    fn test_validate_unknown_type() {
        let table = raw_table(&[
            &["2020-01-15", "T", "USD", "-100", "2024-12-31", "ITD", "Base"],
            &["2020-02-15", "Fee", "USD", "-1", "2024-12-31", "ITD", "Base"],
        ]);
        let err = CashflowSet::validate(&table).unwrap_err();
        assert_eq!(err, CoreError::invalid_domain_value("cashflow type", "Fee", 1));
    }

    #[test]
    fn test_from_table() {
        let set = CashflowSet::from_table(&sample()).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.records()[2].kind, CashflowKind::ResidualValue);
        assert_eq!(set.records()[2].amount, dec!(95.5));
        assert_eq!(set.total(), dec!(23.25));
    }

    #[test]
    fn test_from_table_bad_amount() {
        let table = raw_table(&[&["2020-01-15", "T", "USD", "lots", "2024-12-31", "ITD", "Base"]]);
        let err = CashflowSet::from_table(&table).unwrap_err();
        assert!(matches!(err, CoreError::Parse { ref column, .. } if column == AMOUNT));
    }

    #[test]
    fn test_amount_with_thousands_separator() {
        let table = raw_table(&[&[
            "2020-01-15",
            "T",
            "USD",
            "-1,250,000.50",
            "2024-12-31",
            "ITD",
            "Base",
        ]]);
        let set = CashflowSet::from_table(&table).unwrap();
        assert_eq!(set.total(), dec!(-1250000.50));
    }

    #[test]
    fn test_filter_and_sum() {
        let set = CashflowSet::from_table(&sample()).unwrap();
        assert_eq!(CashflowSet::sum(&set.filter_by_kind(CashflowKind::Takedown)), dec!(-100));
        assert_eq!(set.sum_of(CashflowKind::Distribution), dec!(30));
        assert_eq!(set.sum_of(CashflowKind::Other), dec!(-2.25));
        assert_eq!(CashflowSet::sum(&CashflowSet::default()), Decimal::ZERO);
    }

    #[test]
    fn test_filter_does_not_mutate() {
        let set = CashflowSet::from_table(&sample()).unwrap();
        let _ = set.filter_by_kind(CashflowKind::Distribution);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_currencies() {
        let table = raw_table(&[
            &["2020-01-15", "T", "USD", "-100", "2024-12-31", "ITD", "Base"],
            &["2024-01-15", "T", "EUR", "-10", "2024-12-31", "YTD", "Base"],
        ]);
        let set = CashflowSet::from_table(&table).unwrap();
        assert_eq!(set.currencies().into_iter().collect::<Vec<_>>(), vec!["EUR", "USD"]);
    }
}
