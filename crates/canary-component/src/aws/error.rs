//! AWS error classification and handling
//!
//! Classifies AWS SDK errors by their error code (`.code()` from
//! `ProvideErrorMetadata`) rather than string matching on messages.
//! A missing resource is an "absent" outcome; everything else is fatal.

use aws_sdk_synthetics::error::ProvideErrorMetadata;
use thiserror::Error;

/// AWS error categories for lookup and cleanup logic
#[derive(Debug, Error)]
pub enum AwsError {
    /// Resource was not found (an "absent" signal, not a failure)
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    /// Any other AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }
}

/// Known AWS error codes for "not found" conditions across the services used
const NOT_FOUND_CODES: &[&str] = &[
    "ResourceNotFoundException",
    "NoSuchEntity",
    "NotFound",
    "NoSuchBucket",
    "NoSuchKey",
];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound { message },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify any SDK error (operation error or `SdkError` wrapper).
pub fn classify_sdk_error<E: ProvideErrorMetadata>(error: &E) -> AwsError {
    classify_aws_error(error.code(), error.message())
}

/// Check whether an SDK error reports a missing resource
pub fn is_not_found<E: ProvideErrorMetadata>(error: &E) -> bool {
    classify_sdk_error(error).is_not_found()
}

/// Map a "not found" failure to `Ok(None)`, passing every other error through.
///
/// Lookups use this to turn absence into a normal outcome; tolerant deletes
/// use it so that an already-deleted resource counts as success.
pub fn ignore_not_found<T, E: ProvideErrorMetadata>(result: Result<T, E>) -> Result<Option<T>, E> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if is_not_found(&e) => Ok(None),
        Err(e) => Err(e),
    }
}
