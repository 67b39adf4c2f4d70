// src/database/memory.rs
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use tracing::debug;

use crate::database::models::{BucketCounts, NewSignalRecord, SignalRecord};
use crate::database::store::{SearchPage, SignalStore};
use crate::error::ServiceResult;
use crate::query::{SearchQuery, SummaryQuery};
use crate::summary;

/// Process-local store used for tests and for serving a seeded data set
/// without a database.
#[derive(Default)]
pub struct InMemorySignalStore {
    records: RwLock<Vec<SignalRecord>>,
}

impl InMemorySignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn distinct_by<F>(&self, field: F) -> Vec<String>
    where
        F: Fn(&SignalRecord) -> &str,
    {
        let records = self.records.read();
        let mut seen = HashSet::new();
        records
            .iter()
            .map(|r| field(r))
            .filter(|v| seen.insert(*v))
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl SignalStore for InMemorySignalStore {
    async fn search(&self, query: &SearchQuery) -> ServiceResult<SearchPage> {
        let records = self.records.read();

        let mut matching: Vec<&SignalRecord> = records
            .iter()
            .filter(|r| query.range.contains(&r.ts) && query.filter.matches(r))
            .collect();
        matching.sort_by(|a, b| b.ts.cmp(&a.ts).then_with(|| b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let offset = usize::try_from(query.pagination.offset()).unwrap_or(usize::MAX);
        let page: Vec<SignalRecord> = matching
            .into_iter()
            .skip(offset)
            .take(query.pagination.size as usize)
            .cloned()
            .collect();

        debug!("In-memory search matched {} records, returning {}", total, page.len());
        Ok(SearchPage { records: page, total })
    }

    async fn distinct_symbols(&self) -> ServiceResult<Vec<String>> {
        Ok(self.distinct_by(|r| r.symbol.as_str()))
    }

    async fn distinct_models(&self) -> ServiceResult<Vec<String>> {
        Ok(self.distinct_by(|r| r.model_name.as_str()))
    }

    async fn summary(&self, query: &SummaryQuery) -> ServiceResult<Vec<BucketCounts>> {
        let records = self.records.read();
        let rows = records
            .iter()
            .filter(|r| query.matches(r))
            .map(|r| (&r.ts, r.signal));
        Ok(summary::aggregate(query.group_by, rows))
    }

    async fn insert_batch(&self, records: &[NewSignalRecord]) -> ServiceResult<Vec<SignalRecord>> {
        for record in records {
            record.validate()?;
        }

        let stored: Vec<SignalRecord> = records.iter().cloned().map(NewSignalRecord::into_record).collect();
        self.records.write().extend(stored.iter().cloned());
        Ok(stored)
    }
}
