//! Ordered fallback over fetch strategies.
//!
//! A [`SourceChain`] tries each strategy for one table in turn and stops at
//! the first one that yields rows. No strategy is retried.

use fitboard_source_models::{RawTable, TableRole};

use crate::{SourceError, TableSource};

/// Result of a successful chain fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A strategy returned at least one row.
    Rows(RawTable),
    /// No strategy returned rows, and at least one returned an empty table.
    Empty,
}

/// Strategies for one table, in the order they are tried.
pub struct SourceChain {
    role: TableRole,
    strategies: Vec<Box<dyn TableSource>>,
}

impl std::fmt::Debug for SourceChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceChain")
            .field("role", &self.role)
            .field(
                "strategies",
                &self.strategies.iter().map(|s| s.label()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl SourceChain {
    /// Creates a chain for `role`.
    #[must_use]
    pub fn new(role: TableRole, strategies: Vec<Box<dyn TableSource>>) -> Self {
        Self { role, strategies }
    }

    /// Number of strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns `true` when no strategy is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Tries each strategy until one yields rows.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unavailable`] when every strategy failed (or
    /// none is configured). If at least one strategy reached the source but
    /// found it empty, the result is [`FetchOutcome::Empty`] instead.
    pub async fn fetch(&self) -> Result<FetchOutcome, SourceError> {
        let mut attempts = Vec::new();
        let mut saw_empty = false;

        for (i, strategy) in self.strategies.iter().enumerate() {
            let label = strategy.label();
            log::info!(
                "[{}] Fetching via {label} ({}/{})",
                self.role,
                i + 1,
                self.strategies.len()
            );

            match strategy.fetch().await {
                Ok(table) if !table.is_empty() => {
                    log::info!("[{}] {label}: {} rows", self.role, table.len());
                    return Ok(FetchOutcome::Rows(table));
                }
                Ok(_) => {
                    log::warn!("[{}] {label}: table is empty", self.role);
                    saw_empty = true;
                }
                Err(e) => {
                    log::warn!("[{}] {label} failed: {e}", self.role);
                    attempts.push(format!("{label}: {e}"));
                }
            }
        }

        if saw_empty {
            return Ok(FetchOutcome::Empty);
        }
        if attempts.is_empty() {
            attempts.push("no strategies configured".to_owned());
        }
        Err(SourceError::Unavailable {
            role: self.role,
            attempts,
        })
    }
}
