//! Periodic inventory refresh.
//!
//! The [`Refresher`] fetches the inventory, builds a fresh [`NameTable`] and publishes it to the
//! [`SharedTable`], once per interval, forever. A failed cycle is logged and the previously
//! published table stays in place; the next attempt happens after the same fixed interval.
//! There is no backoff and no give-up point.

use crate::error::Error;
use crate::inventory::DynInventorySource;
use crate::table::{NameTable, SharedTable};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// `SharedStatus` is the refresh loop's bookkeeping, readable by the [operator API][crate::api].
pub type SharedStatus = Arc<RwLock<RefreshStatus>>;

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RefreshStatus {
    /// Cycles attempted so far, successful or not.
    pub cycles: u64,
    pub consecutive_failures: u64,
    pub last_success: Option<OffsetDateTime>,
    pub last_error: Option<String>,
}

pub struct Refresher {
    source: DynInventorySource,
    table: SharedTable,
    status: SharedStatus,
    interval: Duration,
}

impl Refresher {
    pub fn new(
        source: DynInventorySource,
        table: SharedTable,
        status: SharedStatus,
        interval: Duration,
    ) -> Self {
        Refresher {
            source,
            table,
            status,
            interval,
        }
    }

    /// Run refresh cycles until the process exits.
    pub async fn run(self) {
        loop {
            // Failures are already logged and recorded by refresh_once.
            let _ = self.refresh_once().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Run a single refresh cycle, returning the number of published entries.
    ///
    /// # Errors
    ///
    /// Returns the inventory source's [`Error`] if the fetch failed. The published table is
    /// left untouched in that case.
    pub async fn refresh_once(&self) -> Result<usize, Error> {
        match self.source.fetch().await {
            Ok(instances) => {
                let table = NameTable::build(instances);
                let entries = table.len();
                let previous = self.table.publish(table).await;
                self.record_success().await;
                if previous.is_empty() && entries > 0 {
                    tracing::info!("serving {entries} names");
                } else {
                    tracing::debug!("published {entries} names");
                }
                Ok(entries)
            }
            Err(err) => {
                let failures = self.record_failure(&err).await;
                tracing::error!("refresh failed ({failures} in a row): {err}");
                Err(err)
            }
        }
    }

    async fn record_success(&self) {
        let mut status = self.status.write().await;
        status.cycles += 1;
        status.consecutive_failures = 0;
        status.last_success = Some(OffsetDateTime::now_utc());
        status.last_error = None;
    }

    async fn record_failure(&self, err: &Error) -> u64 {
        let mut status = self.status.write().await;
        status.cycles += 1;
        status.consecutive_failures += 1;
        status.last_error = Some(err.to_string());
        status.consecutive_failures
    }
}
