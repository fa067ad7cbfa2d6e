use thiserror::Error;

pub type LabelResult<T> = Result<T, LabelError>;

/// Coarse error taxonomy shared across every crate boundary (spec §7).
///
/// The orchestrator's retry wrapper consults [`ErrorKind::retryable`] rather
/// than matching on concrete variants, so new error sources can be added
/// without touching the retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Network,
    Storage,
    Database,
    Processing,
}

impl ErrorKind {
    pub fn retryable(self) -> bool {
        match self {
            ErrorKind::Network | ErrorKind::Storage | ErrorKind::Database => true,
            ErrorKind::Validation | ErrorKind::Processing => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("stage failed: {stage}: {reason}")]
    StageFailed { stage: String, reason: String },

    #[error("bad input: {0}")]
    BadInput(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LabelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LabelError::Validation(_) | LabelError::BadInput(_) => ErrorKind::Validation,
            LabelError::Network(_) => ErrorKind::Network,
            LabelError::Storage(_) => ErrorKind::Storage,
            LabelError::Database(_) => ErrorKind::Database,
            LabelError::StageFailed { .. } => ErrorKind::Processing,
            LabelError::Serialization(_) => ErrorKind::Processing,
            LabelError::Io(_) => ErrorKind::Storage,
            LabelError::Internal(_) => ErrorKind::Processing,
        }
    }

    pub fn retryable(&self) -> bool {
        self.kind().retryable()
    }
}
