// src/service/signal_service.rs
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::database::store::SignalStore;
use crate::error::ServiceResult;
use crate::query::{Pagination, SearchQuery, SignalFilter, SummaryQuery, TimeRange};
use crate::service::dto::{Page, SignalQueryRequest, SignalResponse, SummaryRequest};
use crate::summary::{GroupBy, SummaryBucket};
use crate::utils::utils::{measure_time, sorted_distinct_ignore_case};

pub const HEALTH_STATUS: &str = "OK";

/// Read-side service over stored signals. The store handle is injected and
/// shared; the service itself keeps no mutable state.
#[derive(Clone)]
pub struct SignalService {
    store: Arc<dyn SignalStore>,
}

impl SignalService {
    pub fn new(store: Arc<dyn SignalStore>) -> Self {
        Self { store }
    }

    pub fn build_search_query(request: &SignalQueryRequest) -> ServiceResult<SearchQuery> {
        Ok(SearchQuery {
            filter: SignalFilter::new(request.symbol.as_deref(), request.model_name.as_deref()),
            range: TimeRange::resolve(request.from.as_deref(), request.to.as_deref(), Utc::now())?,
            pagination: Pagination::new(request.page, request.size)?,
        })
    }

    pub fn build_summary_query(request: &SummaryRequest) -> ServiceResult<SummaryQuery> {
        Ok(SummaryQuery {
            filter: SignalFilter::new(request.symbol.as_deref(), request.model_name.as_deref()),
            range: TimeRange::resolve(request.from.as_deref(), request.to.as_deref(), Utc::now())?,
            group_by: GroupBy::parse_lenient(request.group_by.as_deref()),
        })
    }

    /// Filter and paginate signals, newest first
    #[instrument(skip(self))]
    pub async fn search(&self, request: &SignalQueryRequest) -> ServiceResult<Page<SignalResponse>> {
        let query = Self::build_search_query(request)?;
        let result = measure_time("search", self.store.search(&query)).await?;

        info!(
            "Search {:?} page {} returned {} of {} records",
            query.filter,
            query.pagination.page,
            result.records.len(),
            result.total
        );

        let content = result.records.into_iter().map(SignalResponse::from).collect();
        Ok(Page::new(content, query.pagination, result.total))
    }

    #[instrument(skip(self))]
    pub async fn distinct_symbols(&self) -> ServiceResult<Vec<String>> {
        let symbols = self.store.distinct_symbols().await?;
        Ok(sorted_distinct_ignore_case(symbols))
    }

    #[instrument(skip(self))]
    pub async fn distinct_models(&self) -> ServiceResult<Vec<String>> {
        let models = self.store.distinct_models().await?;
        Ok(sorted_distinct_ignore_case(models))
    }

    /// BUY/SELL/HOLD counts per day, week or month, oldest bucket first
    #[instrument(skip(self))]
    pub async fn summary(&self, request: &SummaryRequest) -> ServiceResult<Vec<SummaryBucket>> {
        let query = Self::build_summary_query(request)?;
        let counts = measure_time("summary", self.store.summary(&query)).await?;

        info!(
            "Summary {:?} by {} produced {} buckets",
            query.filter,
            query.group_by.as_str(),
            counts.len()
        );

        Ok(counts.into_iter().map(SummaryBucket::from).collect())
    }

    pub fn health(&self) -> &'static str {
        HEALTH_STATUS
    }
}
