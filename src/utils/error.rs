use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("{endpoint} answered with HTTP {status}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Authentication failed: {message}")]
    AuthError { message: String },

    #[error("Worksheet '{tab}' not found in spreadsheet")]
    SheetNotFound { tab: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is missing")]
    MissingConfigError { field: String },

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
    Network,
    Authentication,
    Configuration,
    Data,
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
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::HttpStatus { status, .. } if *status == 401 || *status == 403 => {
                ErrorCategory::Authentication
            }
            EtlError::HttpStatus { .. } => ErrorCategory::Network,
            EtlError::AuthError { .. } => ErrorCategory::Authentication,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::SheetNotFound { .. }
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::CsvError(_) | EtlError::IoError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Authentication | ErrorCategory::Configuration => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ApiError(_) => {
                "Check network connectivity to the listing API and the Sheets API".to_string()
            }
            EtlError::HttpStatus { status, .. } if *status == 401 || *status == 403 => {
                "Verify the API client id/secret and the site id".to_string()
            }
            EtlError::HttpStatus { .. } => {
                "The remote service rejected the request; rerun the export later".to_string()
            }
            EtlError::AuthError { .. } => {
                "Make sure the service-account file exists and the account can edit the spreadsheet"
                    .to_string()
            }
            EtlError::SheetNotFound { tab } => {
                format!("Create a tab named '{}' or set sheet.sheet_tab in the config", tab)
            }
            EtlError::MissingConfigError { field } => {
                format!("Set '{}' in the config file or its environment variable", field)
            }
            EtlError::ConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Fix the configuration file and run again".to_string()
            }
            EtlError::CsvError(_) | EtlError::IoError(_) => {
                "Check that the output path is writable".to_string()
            }
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                "The API returned an unexpected payload; inspect it with --verbose".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach a remote service: {}", self),
            ErrorCategory::Authentication => format!("Authentication failed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Export aborted: {}", self),
            ErrorCategory::Storage => format!("Could not write output: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_status_is_critical() {
        let err = EtlError::HttpStatus {
            endpoint: "https://api.example.com/client/token/site".to_string(),
            status: 401,
            body: "bad credentials".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Authentication);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_server_error_is_network() {
        let err = EtlError::HttpStatus {
            endpoint: "https://api.example.com/site/products/search".to_string(),
            status: 502,
            body: String::new(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_missing_tab_suggestion_names_tab() {
        let err = EtlError::SheetNotFound {
            tab: "Biens".to_string(),
        };
        assert!(err.recovery_suggestion().contains("Biens"));
        assert!(err.user_friendly_message().starts_with("Export aborted"));
    }
}
