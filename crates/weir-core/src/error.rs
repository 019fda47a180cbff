use thiserror::Error;

/// Engine-wide error types for Weir.
#[derive(Debug, Error)]
pub enum WeirError {
    /// Settlement-asset transfer failure (insufficient balance, unknown account).
    #[error("Transfer error: {0}")]
    Transfer(String),

    /// Caller does not hold the capability required by the operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A caller-supplied argument failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not permitted in the current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation rejected because the component is paused.
    #[error("Paused: {0}")]
    Paused(String),

    /// Weight balances cannot be moved between accounts.
    #[error("Non-transferable: {0}")]
    NonTransferable(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for WeirError {
    fn from(e: serde_json::Error) -> Self {
        WeirError::Serialization(e.to_string())
    }
}
