//! Pure page normalization: raw screener rows in, [`StockRecord`]s out.

use serde::Deserialize;
use serde_json::Value;

use crate::{NormalizationError, StockRecord, Symbol};

/// One screener row as the upstream sends it. Every field may be absent or null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawStockRow {
    #[serde(rename = "s")]
    pub symbol: Option<String>,
    #[serde(rename = "n")]
    pub name: Option<String>,
    #[serde(rename = "marketCap")]
    pub market_cap: Option<f64>,
    pub price: Option<f64>,
    pub change: Option<f64>,
    #[serde(rename = "changep")]
    pub change_percent: Option<f64>,
    pub revenue: Option<f64>,
}

/// Result of normalizing one page: surviving records plus skipped-record errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedPage {
    pub records: Vec<StockRecord>,
    pub errors: Vec<NormalizationError>,
}

/// Normalize a page of loosely-typed rows, keeping upstream order.
pub fn normalize_page(rows: &[Value]) -> NormalizedPage {
    let mut page = NormalizedPage {
        records: Vec::with_capacity(rows.len()),
        errors: Vec::new(),
    };

    for (index, value) in rows.iter().enumerate() {
        let outcome = RawStockRow::deserialize(value)
            .map_err(|error| NormalizationError::Malformed {
                index,
                message: error.to_string(),
            })
            .and_then(|row| normalize_row(index, row));

        match outcome {
            Ok(record) => page.records.push(record),
            Err(error) => page.errors.push(error),
        }
    }

    page
}

/// Normalize a single typed row. `index` is its position within the page.
pub fn normalize_row(index: usize, row: RawStockRow) -> Result<StockRecord, NormalizationError> {
    let raw_symbol = row
        .symbol
        .filter(|symbol| !symbol.is_empty())
        .ok_or(NormalizationError::MissingSymbol { index })?;
    let symbol = Symbol::parse(&raw_symbol)
        .map_err(|source| NormalizationError::InvalidSymbol { index, source })?;

    Ok(StockRecord {
        symbol,
        company_name: row.name.unwrap_or_default(),
        price: signed(row.price),
        change: signed(row.change),
        percent_change: signed(row.change_percent),
        market_cap: non_negative(row.market_cap),
        revenue: non_negative(row.revenue),
    })
}

fn signed(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn non_negative(value: Option<f64>) -> f64 {
    signed(value).max(0.0)
}
