pub mod aws_error;
pub mod canary;
pub mod content;
pub mod retry;
pub mod schema;

pub use crate::domain::model::{CanaryCode, StringSet};
pub use crate::domain::ports::{CodeSource, ConfigProvider};
pub use crate::utils::error::Result;
