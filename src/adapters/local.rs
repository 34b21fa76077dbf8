use crate::core::content::load_file_content;
use crate::core::{CanaryCode, CodeSource};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Canary code read from the local filesystem; `~` is expanded.
#[derive(Debug, Clone)]
pub struct LocalCodeSource {
    path: String,
}

impl LocalCodeSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CodeSource for LocalCodeSource {
    fn location(&self) -> String {
        self.path.clone()
    }

    async fn fetch(&self) -> Result<CanaryCode> {
        let bytes = load_file_content(&self.path)?;
        Ok(CanaryCode::new(self.location(), bytes))
    }
}
