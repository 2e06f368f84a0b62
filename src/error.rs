use thiserror::Error;

/// Result alias used throughout the library.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Rejected user or file input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker '{ticker}' is longer than {max} characters")]
    TickerTooLong { ticker: String, max: usize },
    #[error("ticker '{ticker}' contains invalid character '{ch}'")]
    TickerInvalidChar { ticker: String, ch: char },
    #[error("company name cannot be empty")]
    EmptyName,
    #[error("'{value}' is not a valid number for {field}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("{field} must be a finite number")]
    NonFiniteNumber { field: &'static str },
    #[error("unknown ratio '{0}'")]
    UnknownRatio(String),
    #[error("financial record for '{ticker}' has no matching company")]
    OrphanFinancial { ticker: String },
    #[error("line {line}: {reason}")]
    InvalidCsvRow { line: u64, reason: String },
}

/// Errors raised by the record store, loader and report layer.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("company '{ticker}' not found")]
    NotFound { ticker: String },

    #[error("company '{ticker}' already exists")]
    DuplicateKey { ticker: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Store contents that the cascade and create-together rules make impossible.
    #[error("store integrity violated: {0}")]
    Integrity(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn not_found(ticker: impl Into<String>) -> Self {
        LedgerError::NotFound { ticker: ticker.into() }
    }

    pub fn duplicate(ticker: impl Into<String>) -> Self {
        LedgerError::DuplicateKey { ticker: ticker.into() }
    }

    /// True for errors caused by what the user typed rather than by the store.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            LedgerError::NotFound { .. } | LedgerError::DuplicateKey { .. } | LedgerError::Validation(_)
        )
    }
}
