//! Error types module
//!
//! Local validation failures are `ValidationError`; everything that can end an
//! upload attempt is unified under `UploadError`. Every variant is terminal for
//! the attempt that produced it: nothing here is retried automatically.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for remote failures the user can re-attempt
    Warn,
    /// Error level - for protocol violations by a remote party
    Error,
}

/// Metadata for error reporting - defines how an error should be presented
/// to the end user and to the logs.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "FILE_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Whether the error was raised before any network I/O
    fn is_local(&self) -> bool;

    /// User-facing message (may differ from the diagnostic `Display` text)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Rejection of a selected file by the field validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes exceeds limit of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Format not allowed: {media_type}")]
    FormatNotAllowed { media_type: String },
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ErrorMetadata for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            ValidationError::FormatNotAllowed { .. } => "FORMAT_NOT_ALLOWED",
        }
    }

    fn is_local(&self) -> bool {
        true
    }

    fn client_message(&self) -> String {
        match self {
            ValidationError::FileTooLarge { .. } => {
                "File size exceeds maximum allowed size".to_string()
            }
            ValidationError::FormatNotAllowed { .. } => "File format not allowed".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}

impl ErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        match self {
            UploadError::Validation(err) => err.error_code(),
            UploadError::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
            UploadError::UploadRejected(_) => "UPLOAD_REJECTED",
            UploadError::MalformedResponse(_) => "MALFORMED_RESPONSE",
        }
    }

    fn is_local(&self) -> bool {
        matches!(self, UploadError::Validation(_))
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::Validation(err) => err.client_message(),
            UploadError::BackendUnavailable(_) => "Failed to get upload URL".to_string(),
            UploadError::UploadRejected(_) => "Upload failed".to_string(),
            UploadError::MalformedResponse(_) => "Unexpected response from server".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            UploadError::Validation(err) => err.log_level(),
            UploadError::BackendUnavailable(_) | UploadError::UploadRejected(_) => LogLevel::Warn,
            UploadError::MalformedResponse(_) => LogLevel::Error,
        }
    }
}
