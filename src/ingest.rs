use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::store::{Batch, SalesRecord};

/// Columns every upload must carry. Anything else is passed through
/// verbatim.
pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "product", "region", "units_sold", "revenue"];

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Failed to decode the file as delimited text: {0}")]
    Decode(#[from] csv::Error),
    #[error("Missing required column {0:?}")]
    MissingColumn(&'static str),
    #[error("Row {row}: cannot coerce {column} value {value:?}")]
    Coercion {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// A parsed upload, still untyped. Shown to the user for confirmation
/// before any coercion or persistence happens.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct SalesTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SalesTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

/// Decodes `bytes` as Latin-1 and parses them as CSV with a header row.
///
/// Latin-1 maps every byte to the Unicode code point of the same value, so
/// legacy spreadsheet exports are tolerated rather than rejected. Structural
/// CSV errors and missing required columns abort the upload before any
/// preview is shown.
pub fn parse(bytes: &[u8]) -> Result<SalesTable, IngestError> {
    let text = decode_latin1(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|column| column == required) {
            return Err(IngestError::MissingColumn(required));
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    log::debug!("Parsed upload with {} rows", rows.len());

    Ok(SalesTable { columns, rows })
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| char::from(byte)).collect()
}

/// Coerces a confirmed table into typed records: `date` as `%Y-%m-%d`,
/// `units_sold` as an integer, `revenue` as a decimal. Any cell that fails
/// coercion rejects the whole batch; there is no partial-success mode.
pub fn coerce(table: &SalesTable) -> Result<Batch, IngestError> {
    let date_index = column_index(table, "date")?;
    let product_index = column_index(table, "product")?;
    let region_index = column_index(table, "region")?;
    let units_index = column_index(table, "units_sold")?;
    let revenue_index = column_index(table, "revenue")?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (index, row) in table.rows.iter().enumerate() {
        // 1-based, matching what the preview shows the user
        let row_number = index + 1;
        let cell = |column: usize| row.get(column).map(String::as_str).unwrap_or("");

        let date = NaiveDate::parse_from_str(cell(date_index), DATE_FORMAT).map_err(|_| {
            coercion_error(row_number, "date", cell(date_index))
        })?;
        let units_sold: i64 = cell(units_index)
            .parse()
            .map_err(|_| coercion_error(row_number, "units_sold", cell(units_index)))?;
        let revenue: Decimal = cell(revenue_index)
            .parse()
            .map_err(|_| coercion_error(row_number, "revenue", cell(revenue_index)))?;

        let mut extra = BTreeMap::new();
        for (column, name) in table.columns.iter().enumerate() {
            if !REQUIRED_COLUMNS.contains(&name.as_str()) {
                extra.insert(name.clone(), cell(column).to_string());
            }
        }

        records.push(SalesRecord {
            date,
            product: cell(product_index).to_string(),
            region: cell(region_index).to_string(),
            units_sold,
            revenue,
            extra,
        });
    }

    Ok(Batch { records })
}

fn column_index(table: &SalesTable, name: &'static str) -> Result<usize, IngestError> {
    table
        .columns
        .iter()
        .position(|column| column == name)
        .ok_or(IngestError::MissingColumn(name))
}

fn coercion_error(row: usize, column: &'static str, value: &str) -> IngestError {
    IngestError::Coercion {
        row,
        column,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    const VALID_CSV: &str = "date,product,region,units_sold,revenue\n\
                             2024-06-01,Widget A,East,10,100\n\
                             2024-06-02,Widget B,West,5,50\n";

    #[test]
    fn parse_valid_upload() {
        let table = parse(VALID_CSV.as_bytes()).unwrap();
        assert_eq!(REQUIRED_COLUMNS.to_vec(), table.columns());
        assert_eq!(2, table.num_rows());
        assert_eq!(
            vec!["2024-06-01", "Widget A", "East", "10", "100"],
            table.rows()[0]
        );
    }

    #[test]
    fn parse_tolerates_latin1_bytes() {
        let upload = b"date,product,region,units_sold,revenue\n\
                       2024-06-01,Caf\xE9 Mug,East,10,100\n";
        let table = parse(upload).unwrap();
        assert_eq!("Café Mug", table.rows()[0][1]);
    }

    #[test]
    fn parse_tolerates_extra_columns() {
        let upload = "date,product,region,units_sold,revenue,salesperson\n\
                      2024-06-01,Widget A,East,10,100,Alice\n";
        let table = parse(upload.as_bytes()).unwrap();
        assert_eq!(6, table.columns().len());
        assert_eq!("Alice", table.rows()[0][5]);
    }

    #[test]
    fn parse_rejects_missing_required_column() {
        let upload = "date,product,units_sold,revenue\n\
                      2024-06-01,Widget A,10,100\n";
        let err = parse(upload.as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn("region")));
    }

    #[test]
    fn parse_rejects_ragged_rows() {
        let upload = "date,product,region,units_sold,revenue\n\
                      2024-06-01,Widget A,East,10\n";
        let err = parse(upload.as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::Decode(_)));
    }

    #[test]
    fn parse_empty_upload_has_no_rows() {
        let upload = "date,product,region,units_sold,revenue\n";
        let table = parse(upload.as_bytes()).unwrap();
        assert_eq!(0, table.num_rows());
    }

    #[test]
    fn coerce_valid_table() {
        let table = parse(VALID_CSV.as_bytes()).unwrap();
        let batch = coerce(&table).unwrap();

        assert_eq!(2, batch.len());
        let first = &batch.records[0];
        assert_eq!(chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), first.date);
        assert_eq!("Widget A", first.product);
        assert_eq!("East", first.region);
        assert_eq!(10, first.units_sold);
        assert_eq!(Decimal::from(100), first.revenue);
        assert!(first.extra.is_empty());
    }

    #[test]
    fn coerce_keeps_extra_columns_verbatim() {
        let upload = "date,product,region,units_sold,revenue,salesperson\n\
                      2024-06-01,Widget A,East,10,100,Alice\n";
        let table = parse(upload.as_bytes()).unwrap();
        let batch = coerce(&table).unwrap();

        assert_eq!(
            Some("Alice"),
            batch.records[0].extra.get("salesperson").map(String::as_str)
        );
    }

    #[test]
    fn coerce_rejects_whole_batch_on_bad_date() {
        let upload = "date,product,region,units_sold,revenue\n\
                      2024-06-01,Widget A,East,10,100\n\
                      2024-06-02,Widget B,West,5,50\n\
                      06/03/2024,Widget C,East,1,10\n\
                      2024-06-04,Widget D,West,2,20\n\
                      2024-06-05,Widget E,East,3,30\n";
        let table = parse(upload.as_bytes()).unwrap();
        let err = coerce(&table).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Coercion { row: 3, column: "date", .. }
        ));
    }

    #[test]
    fn coerce_rejects_non_numeric_units() {
        let upload = "date,product,region,units_sold,revenue\n\
                      2024-06-01,Widget A,East,lots,100\n";
        let table = parse(upload.as_bytes()).unwrap();
        let err = coerce(&table).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Coercion { row: 1, column: "units_sold", .. }
        ));
    }

    #[test]
    fn coerce_rejects_non_numeric_revenue() {
        let upload = "date,product,region,units_sold,revenue\n\
                      2024-06-01,Widget A,East,10,lots\n";
        let table = parse(upload.as_bytes()).unwrap();
        let err = coerce(&table).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Coercion { row: 1, column: "revenue", .. }
        ));
    }

    #[test]
    fn coerce_does_not_validate_signs() {
        let upload = "date,product,region,units_sold,revenue\n\
                      2024-06-01,Refund,East,-2,-19.98\n";
        let table = parse(upload.as_bytes()).unwrap();
        let batch = coerce(&table).unwrap();

        assert_eq!(-2, batch.records[0].units_sold);
        assert_eq!("-19.98".parse::<Decimal>().unwrap(), batch.records[0].revenue);
    }
}
