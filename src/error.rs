use thiserror::Error;

/// Rejection of loan terms by the amortization engine.
///
/// Raised before any schedule computation starts, so a caller never sees a
/// partial schedule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidInputError {
    #[error("principal must be a positive finite number, got {0}")]
    NonPositivePrincipal(f64),
    #[error("annual rate must be a non-negative finite percentage, got {0}")]
    NegativeRate(f64),
    #[error("term must be at least one month, got {0}")]
    NonPositiveTerm(u32),
    #[error("term of {0} months has more installments than a schedule can hold")]
    TermTooLong(u32),
    #[error("annual rate of {0}% makes the loan amounts overflow")]
    RateOutOfRange(f64),
    #[error("unknown payment frequency '{0}'")]
    UnknownFrequency(String),
    #[error("start date {0} leaves the schedule outside the supported calendar range")]
    StartDateOutOfRange(chrono::NaiveDate),
}

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, LoanError>;
