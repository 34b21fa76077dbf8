use crate::domain::model::CanaryCode;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where a canary's code bundle is fetched from.
#[async_trait]
pub trait CodeSource: Send + Sync {
    /// Human-readable location, used in logs and errors.
    fn location(&self) -> String;

    async fn fetch(&self) -> Result<CanaryCode>;
}

#[async_trait]
impl<T: CodeSource + ?Sized> CodeSource for Box<T> {
    fn location(&self) -> String {
        (**self).location()
    }

    async fn fetch(&self) -> Result<CanaryCode> {
        (**self).fetch().await
    }
}

pub trait ConfigProvider: Send + Sync {
    fn code_file(&self) -> Option<&str>;
    fn s3_bucket(&self) -> Option<&str>;
    fn s3_key(&self) -> Option<&str>;
    fn retry_codes(&self) -> &[String];
}
