pub mod record;
pub mod schema;

pub use record::{Record, ResultSet, WorkItem, CSV_HEADERS};
pub use schema::TableSchema;
