use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolboxError {
    #[error("Input format error: {message}")]
    InputFormatError { message: String },

    #[error("IO failure on '{path}': {source}")]
    IoFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

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

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Io,
    Network,
    Configuration,
    Internal,
}

impl ToolboxError {
    pub fn input_format(message: impl Into<String>) -> Self {
        Self::InputFormatError {
            message: message.into(),
        }
    }

    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::IoFailure {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InputFormatError { .. } => ErrorCategory::Input,
            Self::IoFailure { .. } => ErrorCategory::Io,
            Self::HttpError(_) => ErrorCategory::Network,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_) | Self::SerializationError(_) | Self::ProcessingError { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    /// Process exit code for the command layer. Never zero.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input => 2,
            ErrorCategory::Io => 3,
            ErrorCategory::Network => 4,
            ErrorCategory::Configuration | ErrorCategory::Internal => 1,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InputFormatError { message } => format!("Invalid input: {}", message),
            Self::IoFailure { path, source } => match source.kind() {
                std::io::ErrorKind::NotFound => format!("File or directory not found: {}", path),
                std::io::ErrorKind::PermissionDenied => format!("Permission denied: {}", path),
                _ => format!("Could not read or write {}: {}", path, source),
            },
            Self::HttpError(e) if e.is_timeout() => "The request timed out".to_string(),
            Self::HttpError(e) if e.is_connect() => "Could not connect to the server".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => {
                "Check that the input is a JSON array of flat objects, or a CSV file with a header row"
            }
            ErrorCategory::Io => "Check that the paths exist and that you have permission to use them",
            ErrorCategory::Network => "Check the URL and your network connection, or raise --timeout",
            ErrorCategory::Configuration => "Fix the configuration file or command-line flags",
            ErrorCategory::Internal => "Re-run with --verbose and report the output",
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolboxError>;
