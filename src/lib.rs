pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

#[cfg(feature = "s3")]
pub use adapters::S3CodeSource;
pub use adapters::LocalCodeSource;

pub use crate::core::aws_error::{
    is_aws_err, is_aws_err_code_in, is_aws_err_request_failure_status_code, RequestFailure,
};
pub use crate::core::canary::{CanaryCodeLoader, CodeLocation};
pub use crate::core::content::{expand_home, load_file_content};
pub use crate::core::retry::{
    retry_on_aws_code, retry_on_aws_code_with_config, retry_on_aws_codes,
    retry_on_aws_codes_with_config, retry_until_timeout, RetryConfig, RetryError,
};
pub use crate::core::schema::{
    expand_string_list, expand_string_set, flatten_string_list, flatten_string_set,
};
pub use domain::model::{CanaryCode, StringSet};
pub use utils::error::{Result, SyntheticsError};
