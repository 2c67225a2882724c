use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}: {body}")]
    HttpStatus {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Authentication failed: {message}")]
    AuthenticationError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Email delivery error: {message}")]
    EmailError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Configuration,
    Data,
    Notification,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TrackerError {
    pub fn http_status(service: &str, status: reqwest::StatusCode, body: String) -> Self {
        TrackerError::HttpStatus {
            service: service.to_string(),
            status: status.as_u16(),
            body,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            TrackerError::ApiError(_) | TrackerError::HttpStatus { .. } => ErrorCategory::Network,
            TrackerError::AuthenticationError { .. } => ErrorCategory::Authentication,
            TrackerError::ConfigValidationError { .. }
            | TrackerError::InvalidConfigValueError { .. }
            | TrackerError::MissingConfigError { .. } => ErrorCategory::Configuration,
            TrackerError::SerializationError(_) | TrackerError::ProcessingError { .. } => {
                ErrorCategory::Data
            }
            TrackerError::EmailError { .. } => ErrorCategory::Notification,
            TrackerError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TrackerError::EmailError { .. } => ErrorSeverity::Low,
            TrackerError::ApiError(_) | TrackerError::HttpStatus { .. } => ErrorSeverity::Medium,
            TrackerError::AuthenticationError { .. }
            | TrackerError::ConfigValidationError { .. }
            | TrackerError::InvalidConfigValueError { .. }
            | TrackerError::MissingConfigError { .. }
            | TrackerError::SerializationError(_)
            | TrackerError::ProcessingError { .. } => ErrorSeverity::High,
            TrackerError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            TrackerError::ApiError(_) => {
                "Check the network connection and that the API endpoints are reachable".to_string()
            }
            TrackerError::HttpStatus { service, status, .. } => match status {
                401 | 403 => format!("Check the credentials configured for {}", service),
                429 => format!(
                    "{} is rate limiting requests; raise search.request_delay_ms",
                    service
                ),
                _ => format!("Check the {} endpoint configuration and try again later", service),
            },
            TrackerError::AuthenticationError { .. } => {
                "Verify AMADEUS_API_KEY and AMADEUS_SECRET".to_string()
            }
            TrackerError::ConfigValidationError { field, .. }
            | TrackerError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting in the configuration", field)
            }
            TrackerError::MissingConfigError { field } => {
                format!("Set '{}' in the config file or environment", field)
            }
            TrackerError::EmailError { .. } => {
                "Check the SMTP address and the sender's email credentials".to_string()
            }
            TrackerError::SerializationError(_) | TrackerError::ProcessingError { .. } => {
                "The API returned data in an unexpected shape; run with --verbose".to_string()
            }
            TrackerError::IoError(_) => "Check file paths and permissions".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not talk to a remote service: {}", self),
            ErrorCategory::Authentication => format!("Login to the flight API failed: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Unexpected data: {}", self),
            ErrorCategory::Notification => format!("Notification failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
