//! String-typed tabular record sets.
//!
//! Inputs arrive as flat tables (warehouse extracts, CSV files). [`Table`]
//! keeps them untyped so that schema problems surface as
//! [`CoreError::MissingColumn`] at validation time instead of at parse time,
//! and so that grouping attributes can be chosen by name at runtime.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// An ordered set of named columns with one string cell per column per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table with the given header.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DuplicateColumn` if a column name repeats.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> CoreResult<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(CoreError::DuplicateColumn {
                    column: column.clone(),
                });
            }
        }
        Ok(Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        })
    }

    /// Creates a table from a header and rows.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate columns or rows of the wrong width.
    pub fn from_rows(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> CoreResult<Self> {
        let mut table = Self::new(name, columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Convenience constructor from string slices, mostly for fixtures.
    ///
    /// # Errors
    ///
    /// Same as [`Table::from_rows`].
    pub fn from_str_rows(name: &str, columns: &[&str], rows: &[&[&str]]) -> CoreResult<Self> {
        Self::from_rows(
            name,
            columns.iter().map(|c| (*c).to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| (*c).to_string()).collect())
                .collect(),
        )
    }

    /// Reads a headed CSV document.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Csv` if the reader fails, plus any header/row error.
    pub fn from_csv_reader<R: io::Read>(name: impl Into<String>, reader: R) -> CoreResult<Self> {
        Self::read_csv(name, csv_reader_builder().from_reader(reader))
    }

    /// Reads a headed CSV file from disk.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Csv` if the file cannot be opened or read.
    pub fn from_csv_path(name: impl Into<String>, path: impl AsRef<Path>) -> CoreResult<Self> {
        Self::read_csv(name, csv_reader_builder().from_path(path)?)
    }

    fn read_csv<R: io::Read>(
        name: impl Into<String>,
        mut reader: csv::Reader<R>,
    ) -> CoreResult<Self> {
        let columns = reader.headers()?.iter().map(str::to_string).collect();
        let mut table = Self::new(name, columns)?;
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(str::to_string).collect())?;
        }
        Ok(table)
    }

    /// Appends a row.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::RaggedRow` if the row width differs from the header.
    pub fn push_row(&mut self, row: Vec<String>) -> CoreResult<()> {
        if row.len() != self.columns.len() {
            return Err(CoreError::RaggedRow {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Logical table name used in schema errors.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns true if the header contains `column`.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Position of `column` in the header.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingColumn` if absent.
    pub fn column_index(&self, column: &str) -> CoreResult<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| CoreError::missing_column(&self.name, column))
    }

    /// Checks that every column in `required` is present.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingColumn` naming the first absent column.
    pub fn require_columns(&self, required: &[&str]) -> CoreResult<()> {
        for column in required {
            self.column_index(column)?;
        }
        Ok(())
    }

    /// Cell at (`row`, `column`).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingColumn` if the column is absent.
    pub fn value(&self, row: usize, column: &str) -> CoreResult<Option<&str>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.get(row).map(|r| r[idx].as_str()))
    }

    /// Iterates over one column's cells.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingColumn` if the column is absent.
    pub fn column_values(&self, column: &str) -> CoreResult<impl Iterator<Item = &str> + '_> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(move |r| r[idx].as_str()))
    }

    /// Distinct values of a column, sorted.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingColumn` if the column is absent.
    pub fn distinct(&self, column: &str) -> CoreResult<BTreeSet<String>> {
        Ok(self.column_values(column)?.map(str::to_string).collect())
    }

    /// Partitions the rows by the value of `column`.
    ///
    /// Groups come back keyed and sorted by value; rows keep their original
    /// relative order inside each group.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingColumn` if the column is absent.
    pub fn group_by(&self, column: &str) -> CoreResult<BTreeMap<String, Table>> {
        let idx = self.column_index(column)?;
        let mut groups: BTreeMap<String, Table> = BTreeMap::new();
        for row in &self.rows {
            groups
                .entry(row[idx].clone())
                .or_insert_with(|| self.empty_like())
                .rows
                .push(row.clone());
        }
        Ok(groups)
    }

    /// Keeps the rows matching `predicate`.
    #[must_use]
    pub fn filter<F>(&self, predicate: F) -> Table
    where
        F: Fn(&[String]) -> bool,
    {
        Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| predicate(r.as_slice()))
                .cloned()
                .collect(),
        }
    }

    /// Keeps the rows whose `column` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingColumn` if the column is absent.
    pub fn filter_eq(&self, column: &str, value: &str) -> CoreResult<Table> {
        let idx = self.column_index(column)?;
        Ok(self.filter(|row| row[idx] == value))
    }

    /// Sets `column` to `value` on every row, appending the column if needed.
    #[must_use]
    pub fn with_constant_column(&self, column: &str, value: &str) -> Table {
        let mut out = self.clone();
        match out.columns.iter().position(|c| c == column) {
            Some(idx) => {
                for row in &mut out.rows {
                    row[idx] = value.to_string();
                }
            }
            None => {
                out.columns.push(column.to_string());
                for row in &mut out.rows {
                    row.push(value.to_string());
                }
            }
        }
        out
    }

    /// Stacks tables vertically under the union of their headers.
    ///
    /// Columns keep first-seen order; cells for columns a source table lacks
    /// are left empty.
    #[must_use]
    pub fn concat<'a>(
        name: impl Into<String>,
        tables: impl IntoIterator<Item = &'a Table>,
    ) -> Table {
        let tables: Vec<&Table> = tables.into_iter().collect();
        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(tables.iter().map(|t| t.len()).sum());
        for table in &tables {
            let mapping: Vec<Option<usize>> = columns
                .iter()
                .map(|c| table.columns.iter().position(|tc| tc == c))
                .collect();
            for row in &table.rows {
                rows.push(
                    mapping
                        .iter()
                        .map(|m| m.map_or_else(String::new, |i| row[i].clone()))
                        .collect(),
                );
            }
        }

        Table {
            name: name.into(),
            columns,
            rows,
        }
    }

    fn empty_like(&self) -> Table {
        Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: Vec::new(),
        }
    }
}

fn csv_reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).trim(csv::Trim::All);
    builder
}
