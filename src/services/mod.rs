pub mod code_discovery;
pub mod csv_sink;
pub mod listing;
pub mod normalize;
pub mod retry;

pub use code_discovery::CodeDiscovery;
pub use csv_sink::{CsvSink, SinkOutcome};
pub use listing::prepare_listing;
pub use retry::{retry_on_stale, RetryError, RetryPolicy};
