use std::path::Path;
use std::str::FromStr as _;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use super::record::{Batch, SalesRecord};
use super::schema;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("A store already exists at {path}")]
    AlreadyExists { path: String },
    #[error("No store found at {path}, run `init` first")]
    NotFound { path: String },
    #[error("The store has schema version {found} but this build expects {expected}")]
    SchemaVersion { found: i64, expected: i64 },
    #[error("Failed to open the store: {0}")]
    Open(#[source] rusqlite::Error),
    #[error("Failed to persist the batch: {0}")]
    Persist(#[source] rusqlite::Error),
    #[error("Failed to read sales records: {0}")]
    Read(#[source] rusqlite::Error),
    #[error("Failed to encode extra columns: {0}")]
    Extra(#[source] serde_json::Error),
}

/// Handle to the durable `sales` table. Constructed explicitly per run and
/// passed to each pipeline call, there is no global connection.
#[derive(Debug)]
pub struct SalesStore {
    conn: Connection,
}

impl SalesStore {
    /// Creates a new store file and declares its schema. Fails if the file
    /// already exists.
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        if path.exists() {
            return Err(StoreError::AlreadyExists {
                path: path.display().to_string(),
            });
        }
        log::info!("Creating store...");
        let conn = Connection::open(path).map_err(StoreError::Open)?;
        schema::declare(&conn).map_err(StoreError::Open)?;
        log::info!("Creating store...done");
        Ok(Self { conn })
    }

    /// Opens an existing store and verifies its schema version.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound {
                path: path.display().to_string(),
            });
        }
        let conn = Connection::open(path).map_err(StoreError::Open)?;
        let found = schema::version(&conn).map_err(StoreError::Open)?;
        if found != schema::SCHEMA_VERSION {
            return Err(StoreError::SchemaVersion {
                found,
                expected: schema::SCHEMA_VERSION,
            });
        }
        Ok(Self { conn })
    }

    /// Appends all rows of `batch` in one transaction, preserving row order.
    /// Never overwrites or merges existing rows; a failure rolls the whole
    /// batch back.
    pub fn append(&mut self, batch: &Batch) -> Result<(), StoreError> {
        let tx = self.conn.transaction().map_err(StoreError::Persist)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO sales (date, product, region, units_sold, revenue, extra)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .map_err(StoreError::Persist)?;
            for record in &batch.records {
                let extra = serde_json::to_string(&record.extra).map_err(StoreError::Extra)?;
                stmt.execute(params![
                    record.date.format(DATE_FORMAT).to_string(),
                    record.product,
                    record.region,
                    record.units_sold,
                    record.revenue.to_string(),
                    extra,
                ])
                .map_err(StoreError::Persist)?;
            }
        }
        tx.commit().map_err(StoreError::Persist)?;
        log::debug!("Appended {} rows", batch.len());
        Ok(())
    }

    /// Returns the full store contents in insertion order. Read failures are
    /// surfaced, not swallowed into an empty result.
    pub fn load_all(&self) -> Result<Vec<SalesRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT date, product, region, units_sold, revenue, extra FROM sales ORDER BY id")
            .map_err(StoreError::Read)?;
        let rows = stmt
            .query_map([], |row| {
                let date: String = row.get(0)?;
                let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
                    .map_err(|err| conversion_error(0, err))?;
                let revenue: String = row.get(4)?;
                let revenue =
                    Decimal::from_str(&revenue).map_err(|err| conversion_error(4, err))?;
                let extra: String = row.get(5)?;
                let extra =
                    serde_json::from_str(&extra).map_err(|err| conversion_error(5, err))?;
                Ok(SalesRecord {
                    date,
                    product: row.get(1)?,
                    region: row.get(2)?,
                    units_sold: row.get(3)?,
                    revenue,
                    extra,
                })
            })
            .map_err(StoreError::Read)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::Read)
    }
}

fn conversion_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}
