use thiserror::Error;

pub type CacheResult<T> = Result<T, CacheError>;

/// Persistence failures surfaced to the caller unchanged; nothing here is
/// retried internally.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache entry encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}
