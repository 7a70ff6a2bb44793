//! Collection layer for the kolscope analytics pipeline.
//!
//! Walks the cursor-paginated X-data proxy endpoints to a complete,
//! deduplicated follower listing and tweet history, tolerating the
//! upstream's partial unreliability: transient failures are retried with
//! back-off, 4xx pages are skipped, and doubly-JSON-encoded envelopes are
//! normalized before parsing.

mod client;
mod error;
mod followers;
mod normalize;
mod paginate;
mod retry;
mod tweets;
mod wire;

pub use client::ApiClient;
pub use error::CollectorError;
pub use normalize::normalize_nested_json;
pub use paginate::{collect_pages, CollectLimits, Collection, Page, StopReason};
