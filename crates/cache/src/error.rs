use thiserror::Error;

/// Errors returned by cache and ranking operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The store is unreachable or refused the command.
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// `increment` hit a key that does not hold an integer.
    #[error("Value at {key} is not an integer")]
    NotAnInteger { key: String },

    /// A Redis driver error occurred.
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
