use crate::domain::model::{FieldErrors, LeadField};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadError {
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

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

    #[error("Lead validation failed on {} field(s)", .errors.len())]
    Validation { errors: FieldErrors },

    #[error("Field '{field}' expects a {expected} value")]
    FieldType {
        field: LeadField,
        expected: &'static str,
    },

    #[error("Remote insert rejected with status {status}: {body}")]
    RemoteRejected { status: u16, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Remote,
    Configuration,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LeadError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LeadError::Http(_) => ErrorCategory::Network,
            LeadError::RemoteRejected { .. } => ErrorCategory::Remote,
            LeadError::ConfigValidationError { .. }
            | LeadError::InvalidConfigValueError { .. }
            | LeadError::MissingConfigError { .. } => ErrorCategory::Configuration,
            LeadError::Validation { .. } | LeadError::FieldType { .. } => ErrorCategory::Input,
            LeadError::Io(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            // 使用者可以重新送出
            ErrorCategory::Network | ErrorCategory::Remote => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息，不透露遠端失敗的原因
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Remote => {
                "We couldn't send your request. Please try again.".to_string()
            }
            ErrorCategory::Input => match self {
                LeadError::Validation { errors } => format!(
                    "Please fix the highlighted fields: {}",
                    errors
                        .keys()
                        .map(|field| field.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                other => other.to_string(),
            },
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("Unexpected system error: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LeadError::Http(_) => "Check your network connection and resubmit".to_string(),
            LeadError::RemoteRejected { .. } => {
                "Resubmit later, or check the table permissions for the anon key".to_string()
            }
            LeadError::MissingConfigError { field } => {
                format!("Set '{}' in the config file or environment", field)
            }
            LeadError::ConfigValidationError { .. } | LeadError::InvalidConfigValueError { .. } => {
                "Review the [remote] and [form] sections of your config".to_string()
            }
            LeadError::Validation { .. } => "Correct the listed fields and submit again".to_string(),
            LeadError::FieldType { field, expected } => {
                format!("Pass a {} value for '{}'", expected, field)
            }
            LeadError::Io(_) => "Check that the file exists and is readable".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LeadError>;
