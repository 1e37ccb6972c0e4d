/// Errors produced by the ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] bincode::Error),

    #[error("plan encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("ledger corrupted: {0}")]
    Corrupted(String),

    #[error("invalid ledger key: {0}")]
    InvalidKey(String),

    #[error("ledger lock poisoned")]
    Poisoned,
}
