mod record;
mod schema;
mod sqlite;

pub use record::{Batch, SalesRecord};
pub use schema::SCHEMA_VERSION;
pub use sqlite::{SalesStore, StoreError};
