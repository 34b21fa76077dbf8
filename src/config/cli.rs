use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "synthetics-code")]
#[command(about = "Load and inspect CloudWatch Synthetics canary code bundles")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file (supports ~)")]
    pub config: Option<String>,

    #[arg(long, help = "Local canary zip file (supports ~)")]
    pub code_file: Option<String>,

    #[arg(long)]
    pub s3_bucket: Option<String>,

    #[arg(long)]
    pub s3_key: Option<String>,

    #[arg(long)]
    pub s3_region: Option<String>,

    #[arg(long, value_delimiter = ',', help = "AWS error codes to retry")]
    pub retry_codes: Vec<String>,

    #[arg(long, help = "Retry deadline in seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if self.code_file.is_some() {
            config.code.file = self.code_file.clone();
        }
        if self.s3_bucket.is_some() {
            config.code.s3_bucket = self.s3_bucket.clone();
        }
        if self.s3_key.is_some() {
            config.code.s3_key = self.s3_key.clone();
        }
        if self.s3_region.is_some() {
            config.code.s3_region = self.s3_region.clone();
        }
        if !self.retry_codes.is_empty() {
            config.code.retry_codes = self.retry_codes.clone();
        }
        if let Some(timeout_seconds) = self.timeout_seconds {
            let retry = config
                .retry_config()
                .with_timeout(Duration::from_secs(timeout_seconds));
            config.retry = Some(retry);
        }

        Ok(config)
    }
}
