use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// Latest known data for one listed company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub symbol: Symbol,
    pub company_name: String,
    pub price: f64,
    pub change: f64,
    pub percent_change: f64,
    pub market_cap: f64,
    pub revenue: f64,
}

impl StockRecord {
    /// Case-insensitive substring match against symbol or company name.
    /// `needle_lower` must already be lowercase.
    pub fn matches_query(&self, needle_lower: &str) -> bool {
        self.symbol
            .as_str()
            .to_lowercase()
            .contains(needle_lower)
            || self.company_name.to_lowercase().contains(needle_lower)
    }
}

/// Complete, immutable set of records captured at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    records: Vec<StockRecord>,
    captured_at: UtcDateTime,
}

impl Snapshot {
    /// Build a snapshot stamped with the current time.
    pub fn new(records: Vec<StockRecord>) -> Result<Self, ValidationError> {
        Self::captured_at(records, UtcDateTime::now())
    }

    pub fn captured_at(
        records: Vec<StockRecord>,
        captured_at: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        if records.is_empty() {
            return Err(ValidationError::EmptySnapshot);
        }

        Ok(Self {
            records,
            captured_at,
        })
    }

    pub fn records(&self) -> &[StockRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn timestamp(&self) -> UtcDateTime {
        self.captured_at
    }

    pub fn age(&self) -> Duration {
        self.captured_at.elapsed()
    }

    /// Advisory freshness: stale snapshots are still served.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}
