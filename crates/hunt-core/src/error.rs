use contracts::ErrorCode;
use thiserror::Error;

/// Failure reported by an external collaborator (stats store, bet ledger, leaderboard).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{collaborator}: {message}")]
pub struct SyncError {
    pub collaborator: &'static str,
    pub message: String,
}

impl SyncError {
    pub fn new(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self {
            collaborator,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HuntError {
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("market {0} is closed")]
    MarketClosed(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("external sync failed: {0}")]
    ExternalSyncFailure(#[from] SyncError),
    #[error("invalid location catalog: {0}")]
    InvalidCatalog(String),
}

impl HuntError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidState(_) => ErrorCode::InvalidState,
            Self::InvalidAmount(_) => ErrorCode::InvalidAmount,
            Self::MarketClosed(_) => ErrorCode::MarketClosed,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::ExternalSyncFailure(_) => ErrorCode::ExternalSyncFailure,
            Self::InvalidCatalog(_) => ErrorCode::InternalError,
        }
    }
}

pub type HuntResult<T> = Result<T, HuntError>;
