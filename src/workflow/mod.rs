pub mod item_ctx;
pub mod item_fetcher;

pub use item_ctx::ItemCtx;
pub use item_fetcher::{FetchStage, ItemFetchError, ItemFetcher, ItemOutcome};
