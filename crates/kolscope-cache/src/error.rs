use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend failure: {context}")]
    Backend { context: String },

    #[error("failed to serialize cache entry for {key}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
