use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Validation failed for '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("API request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Authentication rejected: {message}")]
    Unauthorized { message: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Network,
    Remote,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PortfolioError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::ValidationError { .. } => ErrorCategory::Input,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::HttpError(_) => ErrorCategory::Network,
            Self::Api { .. } | Self::Unauthorized { .. } | Self::NotFound { .. } => {
                ErrorCategory::Remote
            }
            Self::CsvError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::Storage
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound { .. } => ErrorSeverity::Low,
            Self::HttpError(_) => ErrorSeverity::Medium,
            Self::Api { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            Self::IoError(_) | Self::SerializationError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidInput { message } => format!("Cannot compute allocation: {}", message),
            Self::ValidationError { field, message } => format!("{}: {}", field, message),
            Self::HttpError(_) => "Could not reach the portfolio API".to_string(),
            Self::Api { status, message } => {
                format!("The API rejected the request ({}): {}", status, message)
            }
            Self::Unauthorized { message } => format!("Login failed: {}", message),
            Self::NotFound { what } => format!("{} was not found", what),
            Self::CsvError(e) => format!("Could not write CSV output: {}", e),
            Self::IoError(e) => format!("File system error: {}", e),
            Self::SerializationError(e) => format!("Unexpected data format: {}", e),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            Self::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => {
                "Check the portfolio fields: every asset needs a leverage of 1 or 2 \
                 and the total must be positive"
            }
            ErrorCategory::Configuration => {
                "Review portfolio-client.toml or the command-line flags"
            }
            ErrorCategory::Network => "Check the API base URL and your connection, then retry",
            ErrorCategory::Remote => match self {
                Self::Unauthorized { .. } => {
                    "Verify your username and password or refresh your token"
                }
                Self::Api { status, .. } if *status >= 500 => {
                    "The server is having trouble; try again later"
                }
                _ => "Refresh the portfolio list and check the identifier",
            },
            ErrorCategory::Storage => "Check the output path and file permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, PortfolioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_drives_exit_codes() {
        assert_eq!(
            PortfolioError::invalid_input("empty").severity(),
            ErrorSeverity::High
        );
        assert_eq!(
            PortfolioError::Api {
                status: 503,
                message: "down".to_string()
            }
            .severity(),
            ErrorSeverity::Medium
        );
        assert_eq!(
            PortfolioError::NotFound {
                what: "Portfolio 3".to_string()
            }
            .severity(),
            ErrorSeverity::Low
        );
    }

    #[test]
    fn test_retryable_statuses() {
        let gateway = PortfolioError::Api {
            status: 502,
            message: String::new(),
        };
        let bad_request = PortfolioError::Api {
            status: 400,
            message: String::new(),
        };
        assert!(gateway.is_retryable());
        assert!(!bad_request.is_retryable());
    }

    #[test]
    fn test_category() {
        let err = PortfolioError::validation("name", "required");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.user_friendly_message(), "name: required");
    }
}
