use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Classifier request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Failed to extract {format} text: {message}")]
    ExtractionError { format: String, message: String },

    #[error("Classifier error: {message}")]
    ClassifierError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Io,
    Network,
    Data,
    Extraction,
    Classification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for the command line tools; `Low` still counts as success.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) | EtlError::ZipError(_) => ErrorCategory::Io,
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::ExtractionError { .. } => ErrorCategory::Extraction,
            EtlError::ClassifierError { .. } => ErrorCategory::Classification,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 抽取失敗仍會產出（空的）報告
            ErrorCategory::Extraction => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Classification => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the command line flags or the TOML configuration file"
            }
            ErrorCategory::Io => "Check that the document exists and the output path is writable",
            ErrorCategory::Network => "Check that the classifier endpoint is reachable and retry",
            ErrorCategory::Data => "Inspect the input document and the report output formats",
            ErrorCategory::Extraction => {
                "Make sure the document is a valid PDF, DOCX or UTF-8 text file"
            }
            ErrorCategory::Classification => {
                "Check that the classifier returns one prediction per clause"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("File not found: {}", e)
            }
            EtlError::ApiError(e) if e.is_timeout() => {
                "The classifier did not answer in time".to_string()
            }
            EtlError::ApiError(e) if e.is_connect() => {
                "Could not connect to the classifier endpoint".to_string()
            }
            EtlError::MissingConfigError { field } => {
                format!("Missing setting '{}'", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
