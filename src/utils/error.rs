use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required column: {column}")]
    MissingColumnError { column: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Not found: {resource}")]
    NotFoundError { resource: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Processing,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::TomlError(_) => ErrorCategory::Configuration,
            Self::CsvError(_) | Self::MissingColumnError { .. } | Self::ValidationError { .. } => {
                ErrorCategory::Input
            }
            Self::ProcessingError { .. } | Self::SerializationError(_) => ErrorCategory::Processing,
            Self::ZipError(_) | Self::IoError(_) | Self::NotFoundError { .. } => {
                ErrorCategory::Storage
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Storage => match self {
                Self::NotFoundError { .. } => ErrorSeverity::Medium,
                _ => ErrorSeverity::Critical,
            },
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::MissingColumnError { .. } => {
                "Check that the export keeps the original column headers on the third line"
            }
            Self::CsvError(_) | Self::ValidationError { .. } => {
                "Re-export the attendance report as CSV and try again"
            }
            Self::TomlError(_) | Self::ConfigError { .. } => {
                "Fix the rules file syntax; see the [office] section example"
            }
            Self::InvalidConfigValueError { .. } => {
                "Review the configuration values and command line arguments"
            }
            Self::IoError(_) | Self::ZipError(_) => {
                "Check that the output directory exists and is writable"
            }
            Self::NotFoundError { .. } => "Upload the file again to generate a new report",
            Self::ProcessingError { .. } | Self::SerializationError(_) => {
                "Inspect the input rows around the reported value"
            }
        }
    }

    /// Process exit status for the binaries. Never 0 for a real failure.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    /// Message shown to end users (web page, CLI stderr).
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingColumnError { column } => {
                format!("The uploaded file has no '{}' column", column)
            }
            Self::CsvError(e) => format!("The file could not be read as CSV: {}", e),
            Self::NotFoundError { .. } => "File not found".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
