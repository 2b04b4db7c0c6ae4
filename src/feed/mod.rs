pub mod fetch;
pub mod parse;
pub mod types;

pub use fetch::{FeedFetcher, HttpFeedFetcher};
pub use types::{FeedEntry, FeedSource};
