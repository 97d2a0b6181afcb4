#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unsupported storage driver: {0}")]
    UnsupportedDriver(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed entry for key {key}: {reason}")]
    MalformedEntry { key: String, reason: String },

    #[error("Cookie {0} was dropped or is not visible to the document")]
    CookieRejected(String),

    #[error("Cookie jar lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}
