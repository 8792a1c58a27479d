//! Options providers

use crate::chain::OptionsRequest;
use crate::error::FetchError;
use async_trait::async_trait;
use audit_store::{Query, RecordStore};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Source of the selectable values for one level
///
/// Implementations need not sort or deduplicate; the chain does both.
#[async_trait]
pub trait OptionsProvider: Send + Sync {
    /// Values for `request.column` under the given ancestor tuple
    async fn fetch_options(&self, request: &OptionsRequest) -> Result<Vec<String>, FetchError>;
}

/// Provider projecting one column of a store table, filtered by ancestors
#[derive(Clone)]
pub struct StoreOptionsProvider {
    store: Arc<dyn RecordStore>,
    table: String,
}

impl StoreOptionsProvider {
    /// Provider over `table`
    pub fn new(store: Arc<dyn RecordStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Backing table
    #[inline]
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl std::fmt::Debug for StoreOptionsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreOptionsProvider")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl OptionsProvider for StoreOptionsProvider {
    async fn fetch_options(&self, request: &OptionsRequest) -> Result<Vec<String>, FetchError> {
        let query = request
            .ancestors
            .iter()
            .fold(
                Query::table(self.table.as_str()).select(request.column.as_str()),
                |q, (column, value)| q.eq(column.as_str(), value.as_str()),
            );

        let rows = self.store.select(&query).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get(&request.column).and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }
}

/// Run a provider under a fixed timeout
///
/// A fetch that does not resolve in time fails with `FetchError::TimedOut`;
/// the caller retries manually.
pub async fn fetch_with_timeout<P>(
    provider: &P,
    request: &OptionsRequest,
    timeout: Duration,
) -> Result<Vec<String>, FetchError>
where
    P: OptionsProvider + ?Sized,
{
    match tokio::time::timeout(timeout, provider.fetch_options(request)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::TimedOut {
            ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
