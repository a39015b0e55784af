use thiserror::Error;

#[derive(Error, Debug)]
pub enum EgonetError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("VK API error {code}: {message}")]
    VkApiError { code: i64, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Api,
    Data,
    Config,
    System,
}

impl EgonetError {
    pub fn vk(code: i64, message: impl Into<String>) -> Self {
        Self::VkApiError {
            code,
            message: message.into(),
        }
    }

    /// VK error code 6: "Too many requests per second". The client retries
    /// these itself; one escaping means the retry budget is exhausted.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::VkApiError { code: 6, .. })
    }

    /// Profiles that cannot be expanded: access denied (15), deleted or
    /// banned (18), private (30). Collection records these as dead users
    /// and keeps going.
    pub fn is_unreachable_user(&self) -> bool {
        matches!(self, Self::VkApiError { code: 15 | 18 | 30, .. })
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::HttpError(_) => ErrorSeverity::Medium,
            Self::VkApiError { code: 6, .. } => ErrorSeverity::Medium,
            Self::VkApiError { .. } => ErrorSeverity::High,
            Self::CsvError(_) | Self::SerializationError(_) | Self::ProcessingError { .. } => {
                ErrorSeverity::High
            }
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ValidationError { .. } => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) => ErrorCategory::Network,
            Self::VkApiError { .. } => ErrorCategory::Api,
            Self::CsvError(_) | Self::SerializationError(_) | Self::ProcessingError { .. } => {
                ErrorCategory::Data
            }
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ValidationError { .. } => ErrorCategory::Config,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::HttpError(_) => {
                "Check your network connection and that the API base URL is reachable".to_string()
            }
            Self::VkApiError { code: 5, .. } => {
                "The access token was rejected; generate a new token and set VK_TOKEN".to_string()
            }
            Self::VkApiError { code: 6, .. } => {
                "Lower --requests-per-second or wait a moment before retrying".to_string()
            }
            Self::VkApiError { code, .. } => format!(
                "Consult the VK API error reference for code {} and adjust the request",
                code
            ),
            Self::CsvError(_) => "Inspect the node table input for malformed rows".to_string(),
            Self::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            Self::SerializationError(_) => {
                "The adjacency file may be corrupted; re-run the collection".to_string()
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again".to_string()
            }
            Self::MissingConfigError { field } => {
                format!("Provide '{}' on the command line or via the environment", field)
            }
            Self::ProcessingError { .. } => {
                "Verify the input graph is non-empty and well-formed".to_string()
            }
            Self::ValidationError { .. } => "Correct the reported field and retry".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HttpError(_) => "Could not reach the VK API".to_string(),
            Self::VkApiError { code, message } => {
                format!("VK rejected the request (code {}): {}", code, message)
            }
            Self::CsvError(_) => "Failed to process the node table".to_string(),
            Self::IoError(e) => format!("File operation failed: {}", e),
            Self::SerializationError(_) => "Failed to read or write graph data".to_string(),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::MissingConfigError { field } => {
                format!("Required setting '{}' was not provided", field)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            Self::ProcessingError { message } => format!("Processing failed: {}", message),
            Self::ValidationError { message } => format!("Validation failed: {}", message),
        }
    }
}

pub type Result<T> = std::result::Result<T, EgonetError>;
