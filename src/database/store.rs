// src/database/store.rs
use async_trait::async_trait;

use crate::database::models::{BucketCounts, NewSignalRecord, SignalRecord};
use crate::error::ServiceResult;
use crate::query::{SearchQuery, SummaryQuery};

/// One page of records plus the number of records matching the query overall
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub records: Vec<SignalRecord>,
    pub total: u64,
}

/// Read access to stored signals, plus the ingestion hook used by `import`
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Records matching the query, newest first, restricted to the requested page
    async fn search(&self, query: &SearchQuery) -> ServiceResult<SearchPage>;

    /// Every distinct `symbol` value, in no particular order
    async fn distinct_symbols(&self) -> ServiceResult<Vec<String>>;

    /// Every distinct `model_name` value, in no particular order
    async fn distinct_models(&self) -> ServiceResult<Vec<String>>;

    /// BUY/SELL/HOLD counts per bucket, sorted by bucket label. Buckets without
    /// any matching signal are never returned.
    async fn summary(&self, query: &SummaryQuery) -> ServiceResult<Vec<BucketCounts>>;

    /// Persist a batch atomically and return the stored records with their ids
    async fn insert_batch(&self, records: &[NewSignalRecord]) -> ServiceResult<Vec<SignalRecord>>;
}
