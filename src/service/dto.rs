// src/service/dto.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{AssetType, SignalRecord, SignalType};
use crate::query::Pagination;

/// Body of a search request. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignalQueryRequest {
    pub symbol: Option<String>,
    pub model_name: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// Body of a summary request. `group_by` is one of day, week, month.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryRequest {
    pub symbol: Option<String>,
    pub model_name: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub group_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalResponse {
    pub id: Uuid,
    pub symbol: String,
    pub model_name: String,
    pub asset_type: AssetType,
    pub signal: SignalType,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub confidence: Option<f64>,
    pub ts: DateTime<Utc>,
}

impl From<SignalRecord> for SignalResponse {
    fn from(record: SignalRecord) -> Self {
        Self {
            id: record.id,
            symbol: record.symbol,
            model_name: record.model_name,
            asset_type: record.asset_type,
            signal: record.signal,
            price: record.price,
            confidence: record.confidence,
            ts: record.ts,
        }
    }
}

/// One page of results and where it sits in the full result set
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pagination: Pagination, total_elements: u64) -> Self {
        Self {
            content,
            page: pagination.page,
            size: pagination.size,
            total_elements,
            total_pages: pagination.total_pages(total_elements),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
