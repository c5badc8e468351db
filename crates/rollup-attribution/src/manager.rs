//! Investment to manager resolution.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tracing::debug;

use crate::container::InvestmentContainer;
use crate::error::{AttributionError, AttributionResult};

/// Manager of one investment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerInfo {
    /// Investment name.
    pub investment: String,
    /// Manager name; `None` when the dimension table carries none.
    pub manager: Option<String>,
}

/// Memoized investment to manager lookups.
///
/// Owned by the caller and handed to the tree builder, so the cache lives
/// exactly as long as the build that needs it.
#[derive(Debug, Clone, Default)]
pub struct ManagerDirectory {
    manager_column: String,
    entries: BTreeMap<String, ManagerInfo>,
}

impl ManagerDirectory {
    /// Creates an empty directory reading `manager_column`.
    #[must_use]
    pub fn new(manager_column: impl Into<String>) -> Self {
        Self {
            manager_column: manager_column.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Column the directory reads managers from.
    #[must_use]
    pub fn manager_column(&self) -> &str {
        &self.manager_column
    }

    /// Returns the container's manager, reading its dimension table on first use.
    ///
    /// # Errors
    ///
    /// Returns `AttributionError::Ambiguity` if the table names more than
    /// one manager.
    pub fn resolve(
        &mut self,
        container: &dyn InvestmentContainer,
    ) -> AttributionResult<&ManagerInfo> {
        match self.entries.entry(container.name().to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let info = lookup(&self.manager_column, container)?;
                debug!(investment = %info.investment, manager = ?info.manager, "resolved manager");
                Ok(entry.insert(info))
            }
        }
    }

    /// Records a manager directly.
    pub fn insert(&mut self, investment: impl Into<String>, manager: Option<String>) {
        let investment = investment.into();
        self.entries.insert(
            investment.clone(),
            ManagerInfo {
                investment,
                manager,
            },
        );
    }

    /// Cached entry, if resolved.
    #[must_use]
    pub fn get(&self, investment: &str) -> Option<&ManagerInfo> {
        self.entries.get(investment)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn lookup(column: &str, container: &dyn InvestmentContainer) -> AttributionResult<ManagerInfo> {
    let dimn = container.position_dimn();
    let managers: Vec<String> = if dimn.has_column(column) {
        dimn.distinct(column)?
            .into_iter()
            .filter(|m| !m.trim().is_empty())
            .collect()
    } else {
        Vec::new()
    };

    if managers.len() > 1 {
        return Err(AttributionError::ambiguity("manager", container.name(), managers));
    }

    Ok(ManagerInfo {
        investment: container.name().to_string(),
        manager: managers.into_iter().next(),
    })
}
