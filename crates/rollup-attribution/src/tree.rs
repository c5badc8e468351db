//! Attribution tree construction.
//!
//! Position records from every investment are merged into one table, then
//! grouped recursively by a list of attributes. The last level groups by
//! atom id and pulls each atom's precomputed leaf from the container that
//! owns it:
//!
//! ```text
//! Total
//! ├── Sector - Health
//! │   └── P3
//! └── Sector - Tech
//!     ├── P1
//!     └── P2
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use rollup_core::Table;

use crate::config::{AtomConflictPolicy, EngineConfig};
use crate::container::InvestmentContainer;
use crate::error::{AttributionError, AttributionResult};
use crate::layer::ReportingLayer;
use crate::manager::ManagerDirectory;

/// Counts gathered while building a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Layers in the tree, leaves included.
    pub nodes: usize,
    /// Atom layers.
    pub leaves: usize,
    /// Atoms dropped because they span several investments.
    pub skipped_atoms: Vec<String>,
}

/// A built tree and its summary.
#[derive(Debug, Clone)]
pub struct AttributionTree {
    root: ReportingLayer,
    summary: BuildSummary,
}

impl AttributionTree {
    /// The root layer.
    #[must_use]
    pub fn root(&self) -> &ReportingLayer {
        &self.root
    }

    /// Build counts.
    #[must_use]
    pub fn summary(&self) -> &BuildSummary {
        &self.summary
    }

    /// Consumes the tree, keeping the root.
    #[must_use]
    pub fn into_root(self) -> ReportingLayer {
        self.root
    }
}

/// Builds attribution trees over a set of investment containers.
#[derive(Debug)]
pub struct AttributionTreeBuilder {
    config: EngineConfig,
    containers: BTreeMap<String, Arc<dyn InvestmentContainer>>,
    managers: ManagerDirectory,
}

impl AttributionTreeBuilder {
    /// Creates a builder.
    ///
    /// # Errors
    ///
    /// Returns `AttributionError::Config` for an invalid configuration and
    /// `AttributionError::Ambiguity` when two containers share a name.
    pub fn new(
        config: EngineConfig,
        containers: Vec<Arc<dyn InvestmentContainer>>,
        managers: ManagerDirectory,
    ) -> AttributionResult<Self> {
        config.validate()?;

        let mut by_name: BTreeMap<String, Arc<dyn InvestmentContainer>> = BTreeMap::new();
        for container in containers {
            let name = container.name().to_string();
            if by_name.contains_key(&name) {
                return Err(AttributionError::ambiguity(
                    "container",
                    name.clone(),
                    [name.clone(), name],
                ));
            }
            by_name.insert(name, container);
        }

        Ok(Self {
            config,
            containers: by_name,
            managers,
        })
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The manager directory.
    #[must_use]
    pub fn managers(&self) -> &ManagerDirectory {
        &self.managers
    }

    /// Container by investment name.
    #[must_use]
    pub fn container(&self, name: &str) -> Option<&Arc<dyn InvestmentContainer>> {
        self.containers.get(name)
    }

    /// Stacks every container's dimension table into one position-level table.
    ///
    /// Each row is stamped with its investment name and with the manager
    /// resolved through the directory (blank when unknown).
    ///
    /// # Errors
    ///
    /// `AttributionError::EmptySelection` without containers, or a manager
    /// ambiguity.
    pub fn merge_containers(&mut self) -> AttributionResult<Table> {
        if self.containers.is_empty() {
            return Err(AttributionError::empty_selection("no investment containers"));
        }

        let mut stamped = Vec::with_capacity(self.containers.len());
        for (name, container) in &self.containers {
            let manager = self
                .managers
                .resolve(container.as_ref())?
                .manager
                .clone()
                .unwrap_or_default();
            stamped.push(
                container
                    .position_dimn()
                    .with_constant_column(&self.config.investment_column, name)
                    .with_constant_column(&self.config.manager_column, &manager),
            );
        }

        let merged = Table::concat("merged positions", &stamped);
        tracing::debug!(
            investments = stamped.len(),
            rows = merged.len(),
            "merged position records"
        );
        Ok(merged)
    }

    /// Builds a tree over `merged`, grouping by `attribute_by` in order.
    ///
    /// # Errors
    ///
    /// - `CoreError::MissingColumn` if an attribute, the atom id or the
    ///   investment column is absent
    /// - `AttributionError::Ambiguity` for a multi-investment atom under
    ///   `AtomConflictPolicy::Error`
    /// - `AttributionError::UnknownInvestment` / `MissingAtom` when a record
    ///   has no matching container or leaf
    /// - `AttributionError::EmptySelection` when no atom survives
    pub fn build<S: AsRef<str>>(
        &self,
        merged: &Table,
        attribute_by: &[S],
        atom_id_column: &str,
    ) -> AttributionResult<AttributionTree> {
        let attributes: Vec<&str> = attribute_by.iter().map(AsRef::as_ref).collect();

        let mut required = attributes.clone();
        required.push(atom_id_column);
        required.push(&self.config.investment_column);
        merged.require_columns(&required)?;

        let mut summary = BuildSummary::default();
        let root = self
            .build_layer(
                merged,
                self.config.top_level_name.clone(),
                &attributes,
                atom_id_column,
                0,
                &mut summary,
            )?
            .ok_or_else(|| {
                AttributionError::empty_selection(format!(
                    "no atoms left to attribute in '{}'",
                    merged.name()
                ))
            })?;

        tracing::info!(
            root = %root.name(),
            nodes = summary.nodes,
            leaves = summary.leaves,
            skipped = summary.skipped_atoms.len(),
            "built attribution tree"
        );
        Ok(AttributionTree { root, summary })
    }

    /// Merges the containers and builds over the configured atom id column.
    pub fn build_from_config<S: AsRef<str>>(
        &mut self,
        attribute_by: &[S],
    ) -> AttributionResult<AttributionTree> {
        let merged = self.merge_containers()?;
        let atom_id_column = self.config.atom_id_column.clone();
        self.build(&merged, attribute_by, &atom_id_column)
    }

    fn build_layer(
        &self,
        rows: &Table,
        name: String,
        attributes: &[&str],
        atom_id_column: &str,
        depth: usize,
        summary: &mut BuildSummary,
    ) -> AttributionResult<Option<ReportingLayer>> {
        let mut children = Vec::new();

        if depth < attributes.len() {
            let attribute = attributes[depth];
            for (key, group) in rows.group_by(attribute)? {
                let child_name = format!("{attribute} - {key}");
                if let Some(child) = self.build_layer(
                    &group,
                    child_name,
                    attributes,
                    atom_id_column,
                    depth + 1,
                    summary,
                )? {
                    children.push(child);
                }
            }
        } else if depth == attributes.len() {
            for (atom, group) in rows.group_by(atom_id_column)? {
                if let Some(leaf) = self.atom_layer(&atom, &group, summary)? {
                    children.push(leaf);
                }
            }
        } else {
            return Err(AttributionError::DepthOverrun {
                depth,
                max: attributes.len(),
            });
        }

        if children.is_empty() {
            tracing::debug!(layer = %name, "omitting empty layer");
            return Ok(None);
        }

        summary.nodes += 1;
        Ok(Some(ReportingLayer::aggregate(
            name,
            children,
            &self.config.irr,
        )?))
    }

    fn atom_layer(
        &self,
        atom: &str,
        rows: &Table,
        summary: &mut BuildSummary,
    ) -> AttributionResult<Option<ReportingLayer>> {
        let investments: Vec<String> = rows
            .distinct(&self.config.investment_column)?
            .into_iter()
            .filter(|name| !name.trim().is_empty())
            .collect();

        let investment = match investments.as_slice() {
            [single] => single,
            [] => return Err(AttributionError::UnknownInvestment { name: String::new() }),
            _ => match self.config.atom_conflict_policy {
                AtomConflictPolicy::Skip => {
                    tracing::warn!(
                        atom = %atom,
                        investments = ?investments,
                        "skipping atom held by several investments"
                    );
                    summary.skipped_atoms.push(atom.to_string());
                    return Ok(None);
                }
                AtomConflictPolicy::Error => {
                    return Err(AttributionError::ambiguity(
                        "investment",
                        atom,
                        investments.clone(),
                    ));
                }
            },
        };

        let container = self
            .containers
            .get(investment)
            .ok_or_else(|| AttributionError::UnknownInvestment {
                name: investment.clone(),
            })?;
        let interval = &self.config.aggregate_interval;
        let leaf = container
            .atom_level_performance_results(interval)?
            .get(atom)
            .cloned()
            .ok_or_else(|| AttributionError::MissingAtom {
                investment: investment.clone(),
                atom: atom.to_string(),
                interval: interval.clone(),
            })?;

        summary.nodes += 1;
        summary.leaves += 1;
        Ok(Some(ReportingLayer::leaf(atom, leaf, investment.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::InMemoryInvestment;
    use rollup_core::types::REQUIRED_CASHFLOW_COLUMNS;

    fn builder() -> AttributionTreeBuilder {
        let config = EngineConfig::default();
        let mut cols = REQUIRED_CASHFLOW_COLUMNS.to_vec();
        cols.push("PositionId");
        let cashflows = Table::from_str_rows(
            "cf",
            &cols,
            &[
                &["2020-01-01", "T", "USD", "-100", "2024-12-31", "ITD", "Base", "P1"],
                &["2024-12-31", "R", "USD", "120", "2024-12-31", "ITD", "Base", "P1"],
            ],
        )
        .unwrap();
        let dimn =
            Table::from_str_rows("dimn", &["PositionId", "Sector"], &[&["P1", "Tech"]]).unwrap();
        let inv: Arc<dyn InvestmentContainer> =
            Arc::new(InMemoryInvestment::new("Fund I", cashflows, dimn, &config).unwrap());
        AttributionTreeBuilder::new(config, vec![inv], ManagerDirectory::new("ManagerName"))
            .unwrap()
    }

    #[test]
    fn test_depth_overrun_guard() {
        let mut b = builder();
        let merged = b.merge_containers().unwrap();
        let mut summary = BuildSummary::default();
        let err = b
            .build_layer(&merged, "Total".into(), &["Sector"], "PositionId", 2, &mut summary)
            .unwrap_err();
        assert_eq!(err, AttributionError::DepthOverrun { depth: 2, max: 1 });
    }

    #[test]
    fn test_merge_stamps_columns() {
        let mut b = builder();
        let merged = b.merge_containers().unwrap();
        assert!(merged.has_column("InvestmentName"));
        assert!(merged.has_column("ManagerName"));
        assert_eq!(merged.value(0, "InvestmentName").unwrap(), Some("Fund I"));
        assert_eq!(merged.value(0, "ManagerName").unwrap(), Some(""));
    }

    #[test]
    fn test_duplicate_container_names() {
        let b = builder();
        let inv = Arc::clone(b.container("Fund I").unwrap());
        let err = AttributionTreeBuilder::new(
            EngineConfig::default(),
            vec![Arc::clone(&inv), inv],
            ManagerDirectory::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AttributionError::Ambiguity { .. }));
    }

    #[test]
    fn test_unknown_investment() {
        let b = builder();
        let merged = Table::from_str_rows(
            "merged",
            &["PositionId", "InvestmentName"],
            &[&["P1", "Fund Z"]],
        )
        .unwrap();
        let err = b.build(&merged, &[] as &[&str], "PositionId").unwrap_err();
        assert_eq!(
            err,
            AttributionError::UnknownInvestment {
                name: "Fund Z".into()
            }
        );
    }

    #[test]
    fn test_missing_atom() {
        let b = builder();
        let merged = Table::from_str_rows(
            "merged",
            &["PositionId", "InvestmentName"],
            &[&["P9", "Fund I"]],
        )
        .unwrap();
        let err = b.build(&merged, &[] as &[&str], "PositionId").unwrap_err();
        assert!(matches!(err, AttributionError::MissingAtom { ref atom, .. } if atom == "P9"));
    }
}
