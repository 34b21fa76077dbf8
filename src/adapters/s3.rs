use crate::core::aws_error::{is_aws_err, is_aws_err_request_failure_status_code};
use crate::core::retry::{retry_on_aws_codes_with_config, RetryConfig, RetryError};
use crate::core::{CanaryCode, CodeSource};
use crate::utils::error::{Result, SyntheticsError};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as S3Client;
use aws_smithy_types::error::display::DisplayErrorContext;

/// S3 error codes worth retrying when fetching canary code.
pub const DEFAULT_S3_RETRY_CODES: &[&str] =
    &["SlowDown", "InternalError", "ServiceUnavailable", "RequestTimeout"];

/// 建立 S3 client，region 未指定時使用預設 provider chain
pub async fn build_client(region: Option<&str>) -> S3Client {
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let mut builder = aws_sdk_s3::config::Builder::from(&config);
    if let Some(region) = region {
        builder = builder.region(Region::new(region.to_string()));
    }
    S3Client::from_conf(builder.build())
}

#[derive(Debug, Clone)]
pub struct S3CodeSource {
    client: S3Client,
    bucket: String,
    key: String,
    retry_codes: Vec<String>,
    retry: RetryConfig,
}

impl S3CodeSource {
    pub fn new(client: S3Client, bucket: String, key: String) -> Self {
        Self {
            client,
            bucket,
            key,
            retry_codes: DEFAULT_S3_RETRY_CODES.iter().map(|c| c.to_string()).collect(),
            retry: RetryConfig::for_aws_codes(),
        }
    }

    pub fn with_retry_codes(mut self, retry_codes: Vec<String>) -> Self {
        self.retry_codes = retry_codes;
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl CodeSource for S3CodeSource {
    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }

    async fn fetch(&self) -> Result<CanaryCode> {
        let location = self.location();

        let result = retry_on_aws_codes_with_config(&self.retry, &self.retry_codes, || {
            self.client
                .get_object()
                .bucket(&self.bucket)
                .key(&self.key)
                .send()
        })
        .await;

        let resp = match result {
            Ok(resp) => resp,
            // S3 can answer a missing key with a bare 404 and no error code
            Err(RetryError::Operation(err))
                if is_aws_err(&err, "NoSuchKey", "")
                    || is_aws_err_request_failure_status_code(&err, 404) =>
            {
                return Err(SyntheticsError::CodeNotFound { location });
            }
            Err(RetryError::Operation(err)) => {
                return Err(SyntheticsError::AwsError {
                    message: format!(
                        "Failed to read {} from S3: {}",
                        location,
                        DisplayErrorContext(&err)
                    ),
                });
            }
            Err(err @ RetryError::Timeout(_)) => {
                return Err(SyntheticsError::AwsError {
                    message: format!("Failed to read {} from S3: {}", location, err),
                });
            }
        };

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| SyntheticsError::AwsError {
                message: format!("Failed to collect S3 data: {}", e),
            })?;

        Ok(CanaryCode::new(location, data.into_bytes().to_vec()))
    }
}
