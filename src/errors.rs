/// All application errors, categorized by domain.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ── Input ──
    #[error("Invalid date '{0}': expected DD-MM-YYYY")]
    MalformedDate(String),

    #[error("Input directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Failed to read file: {0}")]
    FileRead(String),

    #[error("Failed to write file: {0}")]
    FileWrite(String),

    // ── Records ──
    #[error("Malformed record in {source_name} at line {line}: {message}")]
    MalformedRecord {
        source_name: String,
        line: usize,
        message: String,
    },

    // ── Dispatch ──
    #[error("Unknown group '{0}': no portfolio target registered")]
    UnknownGroup(String),

    #[error("Purchase of {symbol} failed: {reason}")]
    PurchaseFailed { symbol: String, reason: String },

    // ── Driver ──
    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Element '{selector}' not available after {waited_ms} ms")]
    ElementTimeout { selector: String, waited_ms: u64 },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    // ── Configuration ──
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AppError {
    /// Shorthand for a record-level parse failure.
    pub fn malformed(source_name: &str, line: usize, message: impl Into<String>) -> Self {
        AppError::MalformedRecord {
            source_name: source_name.to_string(),
            line,
            message: message.into(),
        }
    }

    /// Stable machine-readable code, used in run reports.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MalformedDate(_) => "MALFORMED_DATE",
            AppError::DirectoryNotFound(_) => "DIRECTORY_NOT_FOUND",
            AppError::FileRead(_) => "FILE_READ",
            AppError::FileWrite(_) => "FILE_WRITE",
            AppError::MalformedRecord { .. } => "MALFORMED_RECORD",
            AppError::UnknownGroup(_) => "UNKNOWN_GROUP",
            AppError::PurchaseFailed { .. } => "PURCHASE_FAILED",
            AppError::Driver(_) => "DRIVER",
            AppError::ElementTimeout { .. } => "ELEMENT_TIMEOUT",
            AppError::Authentication(_) => "AUTHENTICATION",
            AppError::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}

/// Serializable error summary for run reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        ErrorResponse {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

// ── Conversions from external errors ──

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileRead(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::FileWrite(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Driver(err.to_string())
    }
}
