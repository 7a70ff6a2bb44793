use thiserror::Error;

use kolscope_cache::CacheError;

/// Failures that actually escape the orchestrator.
///
/// Collection problems deliberately never appear here: they are folded into
/// the subject's `Unavailable` status so prior cached data stays usable.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("snapshot cache failure")]
    Cache(#[from] CacheError),
}
