//! AWS error classification.
//!
//! Any error that exposes [`ProvideErrorMetadata`] can be matched on its code
//! and message. `SdkError<E, HttpResponse>` implements the trait for every
//! modeled operation error, so SDK results are classified directly. Variants
//! without a service response (dispatch failure, timeout, construction
//! failure) carry no code and never match.

use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;

/// A failed request that may have received an HTTP response.
pub trait RequestFailure {
    /// Status code of the raw response, if one was received.
    fn status_code(&self) -> Option<u16>;
}

impl<E> RequestFailure for SdkError<E, HttpResponse> {
    fn status_code(&self) -> Option<u16> {
        self.raw_response().map(|raw| raw.status().as_u16())
    }
}

/// Returns true if the error matches all these conditions:
/// * the error carries AWS error metadata
/// * its code equals `code`
/// * its message contains `message`
///
/// An empty `message` matches any message, including a missing one.
pub fn is_aws_err<E>(err: &E, code: &str, message: &str) -> bool
where
    E: ProvideErrorMetadata + ?Sized,
{
    err.code() == Some(code) && err.message().unwrap_or_default().contains(message)
}

/// Returns true if the error's code is one of `codes`.
pub fn is_aws_err_code_in<E, S>(err: &E, codes: &[S]) -> bool
where
    E: ProvideErrorMetadata + ?Sized,
    S: AsRef<str>,
{
    match err.code() {
        Some(actual) => codes.iter().any(|code| code.as_ref() == actual),
        None => false,
    }
}

/// Returns true if the request failed with an HTTP response whose status is
/// `status_code`.
///
/// Prefer [`is_aws_err`] except for older APIs (e.g. S3) that sometimes only
/// respond with status codes.
pub fn is_aws_err_request_failure_status_code<E>(err: &E, status_code: u16) -> bool
where
    E: RequestFailure + ?Sized,
{
    err.status_code() == Some(status_code)
}
