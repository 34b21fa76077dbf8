use crate::core::canary::CodeLocation;
use crate::core::content::load_file_content;
use crate::core::retry::RetryConfig;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, SyntheticsError};
use crate::utils::validation::{
    validate_aws_error_codes, validate_file_extension, validate_path, validate_s3_bucket_name,
    validate_non_empty_string, Validate,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub code: CodeConfig,
    pub retry: Option<RetryConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeConfig {
    pub file: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_key: Option<String>,
    pub s3_region: Option<String>,
    #[serde(default)]
    pub retry_codes: Vec<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置，路徑支援 `~`
    pub fn from_file(path: &str) -> Result<Self> {
        let bytes = load_file_content(path)?;
        let content = String::from_utf8(bytes).map_err(|e| SyntheticsError::ConfigError {
            message: format!("{} is not valid UTF-8: {}", path, e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SyntheticsError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Retry settings, falling back to the one-minute multi-code default.
    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_else(RetryConfig::for_aws_codes)
    }
}

impl ConfigProvider for TomlConfig {
    fn code_file(&self) -> Option<&str> {
        self.code.file.as_deref()
    }

    fn s3_bucket(&self) -> Option<&str> {
        self.code.s3_bucket.as_deref()
    }

    fn s3_key(&self) -> Option<&str> {
        self.code.s3_key.as_deref()
    }

    fn retry_codes(&self) -> &[String] {
        &self.code.retry_codes
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        match CodeLocation::from_config(self)? {
            CodeLocation::File(file) => {
                validate_path("code.file", &file)?;
                validate_file_extension("code.file", &file, &["zip"])?;
            }
            CodeLocation::S3 { bucket, key } => {
                validate_s3_bucket_name("code.s3_bucket", &bucket)?;
                validate_non_empty_string("code.s3_key", &key)?;
            }
        }

        validate_aws_error_codes("code.retry_codes", &self.code.retry_codes)?;

        if let Some(retry) = &self.retry {
            retry.validate()?;
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}
