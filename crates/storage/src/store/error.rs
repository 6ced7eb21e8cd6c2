#![forbid(unsafe_code)]

use tp_core::model::ValueTypeError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("unknown list: {0}")]
    UnknownList(i64),
    #[error("not permitted: {0}")]
    NotPermitted(&'static str),
    #[error("task view is read-only")]
    ReadOnlyView,
    #[error("unknown id")]
    UnknownId,
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config: {0}")]
    Config(String),
}

impl StoreError {
    pub(crate) fn violation(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    /// Stable code for callers that map errors onto wire responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvariantViolation(_) => "INVARIANT_VIOLATION",
            Self::UnknownList(_) => "UNKNOWN_LIST",
            Self::NotPermitted(_) => "NOT_PERMITTED",
            Self::ReadOnlyView => "READ_ONLY_VIEW",
            Self::UnknownId => "UNKNOWN_ID",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Sql(_) | Self::Io(_) => "STORE_FAILURE",
            Self::Config(_) => "CONFIG",
        }
    }
}

impl From<ValueTypeError> for StoreError {
    fn from(value: ValueTypeError) -> Self {
        Self::InvariantViolation(value.to_string())
    }
}
