use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyntheticsError {
    #[error("cannot expand user-specific home dir: {path}")]
    UserHomeExpansion { path: String },

    #[error("cannot determine home directory while expanding {path}")]
    HomeDirUnavailable { path: String },

    #[error("failed to read {}: {source}", .path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Canary code not found: {location}")]
    CodeNotFound { location: String },

    #[error("Invalid canary code from {location}: {reason}")]
    InvalidCode { location: String, reason: String },

    #[error("AWS request failed: {message}")]
    AwsError { message: String },
}

impl SyntheticsError {
    /// 根據錯誤類型決定 CLI 退出碼
    pub fn exit_code(&self) -> i32 {
        match self {
            SyntheticsError::ConfigError { .. }
            | SyntheticsError::InvalidConfigValueError { .. }
            | SyntheticsError::MissingConfigError { .. } => 2,
            SyntheticsError::AwsError { .. } => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyntheticsError>;
