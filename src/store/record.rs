use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single ingested sales row. Immutable once stored; the store has no
/// update or delete operation.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub product: String,
    pub region: String,
    /// Sign is not validated, negative values are stored as given.
    pub units_sold: i64,
    /// Sign is not validated, negative values are stored as given.
    #[serde(with = "rust_decimal::serde::str")]
    pub revenue: Decimal,
    /// Columns beyond the recognized five, passed through verbatim.
    pub extra: BTreeMap<String, String>,
}

/// The rows submitted in a single ingestion confirmation. Appended to the
/// store as a whole or not at all.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Batch {
    pub records: Vec<SalesRecord>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
