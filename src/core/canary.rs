use crate::core::{CanaryCode, CodeSource, ConfigProvider};
use crate::utils::error::{Result, SyntheticsError};

/// Where the configured canary code lives. Exactly one location is allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeLocation {
    File(String),
    S3 { bucket: String, key: String },
}

impl CodeLocation {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        match (config.code_file(), config.s3_bucket(), config.s3_key()) {
            (Some(file), None, None) => Ok(CodeLocation::File(file.to_string())),
            (None, Some(bucket), Some(key)) => Ok(CodeLocation::S3 {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            (None, None, None) => Err(SyntheticsError::MissingConfigError {
                field: "code_file or s3_bucket/s3_key".to_string(),
            }),
            (None, Some(_), None) => Err(SyntheticsError::MissingConfigError {
                field: "s3_key".to_string(),
            }),
            (None, None, Some(_)) => Err(SyntheticsError::MissingConfigError {
                field: "s3_bucket".to_string(),
            }),
            (Some(_), _, _) => Err(SyntheticsError::ConfigError {
                message: "code_file cannot be combined with s3_bucket/s3_key".to_string(),
            }),
        }
    }
}

pub struct CanaryCodeLoader<S: CodeSource> {
    source: S,
}

impl<S: CodeSource> CanaryCodeLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetches the bundle and checks that it is a non-empty zip archive.
    pub async fn run(&self) -> Result<(CanaryCode, Vec<String>)> {
        let location = self.source.location();
        tracing::info!("Fetching canary code from {}", location);

        let code = self.source.fetch().await?;
        tracing::debug!("Fetched {} bytes from {}", code.len(), location);

        if code.is_empty() {
            return Err(SyntheticsError::InvalidCode {
                location,
                reason: "file is empty".to_string(),
            });
        }

        let entries = code.entries().map_err(|e| SyntheticsError::InvalidCode {
            location: location.clone(),
            reason: format!("not a zip archive: {}", e),
        })?;

        if entries.is_empty() {
            return Err(SyntheticsError::InvalidCode {
                location,
                reason: "zip archive has no entries".to_string(),
            });
        }

        tracing::info!("Canary code OK: {} entries", entries.len());
        Ok((code, entries))
    }
}
