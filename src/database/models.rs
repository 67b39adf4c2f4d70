// src/database/models.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

/// Classification emitted by a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Buy,
    Sell,
    Hold,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Buy => "BUY",
            SignalType::Sell => "SELL",
            SignalType::Hold => "HOLD",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SignalType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(SignalType::Buy),
            "SELL" => Ok(SignalType::Sell),
            "HOLD" => Ok(SignalType::Hold),
            _ => Err(ParseEnumError {
                kind: "signal",
                value: s.to_string(),
            }),
        }
    }
}

/// Asset class the instrument belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetType {
    Gold,
    Silver,
    Oil,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Gold => "GOLD",
            AssetType::Silver => "SILVER",
            AssetType::Oil => "OIL",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GOLD" => Ok(AssetType::Gold),
            "SILVER" => Ok(AssetType::Silver),
            "OIL" => Ok(AssetType::Oil),
            _ => Err(ParseEnumError {
                kind: "asset type",
                value: s.to_string(),
            }),
        }
    }
}

/// A stored trading signal. Records are never updated once written.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRecord {
    pub id: Uuid,
    pub symbol: String,
    pub model_name: String,
    pub asset_type: AssetType,
    pub signal: SignalType,
    pub price: Option<Decimal>,
    pub confidence: Option<f64>,
    pub ts: DateTime<Utc>,
}

fn decode_column<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = ParseEnumError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: ParseEnumError| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for SignalRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            symbol: row.try_get("symbol")?,
            model_name: row.try_get("model_name")?,
            asset_type: decode_column(row, "asset_type")?,
            signal: decode_column(row, "signal")?,
            price: row.try_get("price")?,
            confidence: row.try_get("confidence")?,
            ts: row.try_get("ts")?,
        })
    }
}

/// A signal as handed over by an ingestion source, before it gets an id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSignalRecord {
    pub symbol: String,
    pub model_name: String,
    pub asset_type: AssetType,
    pub signal: SignalType,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub confidence: Option<f64>,
    pub ts: DateTime<Utc>,
}

impl NewSignalRecord {
    pub fn validate(&self) -> ServiceResult<()> {
        if self.symbol.trim().is_empty() {
            return Err(ServiceError::InvalidRecord("symbol is empty".to_string()));
        }
        if self.model_name.trim().is_empty() {
            return Err(ServiceError::InvalidRecord("modelName is empty".to_string()));
        }
        if let Some(confidence) = self.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(ServiceError::InvalidRecord(format!(
                    "confidence {} outside [0, 1] for {}",
                    confidence, self.symbol
                )));
            }
        }
        if let Some(price) = self.price {
            if price.is_sign_negative() {
                return Err(ServiceError::InvalidRecord(format!(
                    "negative price {} for {}",
                    price, self.symbol
                )));
            }
        }
        Ok(())
    }

    /// Attach a freshly generated id
    pub fn into_record(self) -> SignalRecord {
        SignalRecord {
            id: Uuid::new_v4(),
            symbol: self.symbol,
            model_name: self.model_name,
            asset_type: self.asset_type,
            signal: self.signal,
            price: self.price,
            confidence: self.confidence,
            ts: self.ts,
        }
    }
}

/// Per-bucket signal counts produced by a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketCounts {
    pub bucket: String,
    pub buy: i64,
    pub sell: i64,
    pub hold: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> NewSignalRecord {
        NewSignalRecord {
            symbol: "XAUUSD".to_string(),
            model_name: "u-mamba".to_string(),
            asset_type: AssetType::Gold,
            signal: SignalType::Buy,
            price: Some(Decimal::new(238_450, 2)),
            confidence: Some(0.8),
            ts: Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn signal_type_parses_case_insensitively() {
        assert_eq!("buy".parse::<SignalType>().unwrap(), SignalType::Buy);
        assert_eq!("HOLD".parse::<SignalType>().unwrap(), SignalType::Hold);
        assert!("STRONG_BUY".parse::<SignalType>().is_err());
    }

    #[test]
    fn new_record_deserializes_from_camel_case_json() {
        let json = r#"{
            "symbol": "WTI",
            "modelName": "lstm-v2",
            "assetType": "OIL",
            "signal": "SELL",
            "price": 71.25,
            "ts": "2025-03-04T05:06:07Z"
        }"#;
        let record: NewSignalRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.asset_type, AssetType::Oil);
        assert_eq!(record.signal, SignalType::Sell);
        assert_eq!(record.price, Some(Decimal::new(7125, 2)));
        assert_eq!(record.confidence, None);
    }

    #[test]
    fn validate_rejects_out_of_range_confidence() {
        let mut record = sample();
        record.confidence = Some(1.5);
        assert!(matches!(record.validate(), Err(ServiceError::InvalidRecord(_))));
    }

    #[test]
    fn validate_rejects_blank_symbol() {
        let mut record = sample();
        record.symbol = "  ".to_string();
        assert!(record.validate().is_err());
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn into_record_assigns_distinct_ids() {
        let a = sample().into_record();
        let b = sample().into_record();
        assert_ne!(a.id, b.id);
        assert_eq!(a.symbol, "XAUUSD");
    }
}
