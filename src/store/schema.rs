use rusqlite::Connection;

/// Bump whenever the declared layout of the `sales` table changes.
pub const SCHEMA_VERSION: i64 = 1;

const CREATE_SALES_TABLE: &str = "\
CREATE TABLE sales (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    product TEXT NOT NULL,
    region TEXT NOT NULL,
    units_sold INTEGER NOT NULL,
    revenue TEXT NOT NULL,
    extra TEXT NOT NULL DEFAULT '{}'
)";

/// Declares the schema in a fresh store file and stamps it with
/// [`SCHEMA_VERSION`].
pub fn declare(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute(CREATE_SALES_TABLE, [])?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

pub fn version(conn: &Connection) -> Result<i64, rusqlite::Error> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}
