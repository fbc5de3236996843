#![forbid(unsafe_code)]

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("seed document: {0}")]
    Seed(#[from] serde_yaml::Error),
    #[error("time format: {0}")]
    TimeFormat(#[from] time::error::Format),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("revision mismatch (expected={expected}, actual={actual})")]
    RevisionMismatch { expected: i64, actual: i64 },
    #[error("unknown id")]
    UnknownId,
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO",
            Self::Sql(_) => "SQLITE",
            Self::Seed(_) => "SEED_INVALID",
            Self::TimeFormat(_) => "TIME_FORMAT",
            Self::InvalidInput(message) if message.starts_with("RESET_REQUIRED") => {
                "RESET_REQUIRED"
            }
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::RevisionMismatch { .. } => "REVISION_MISMATCH",
            Self::UnknownId => "UNKNOWN_ID",
        }
    }
}
