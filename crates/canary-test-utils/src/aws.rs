//! AWS test utilities
//!
//! Provides region detection and unique canary names for AWS integration tests.

use chrono::Utc;

/// Get the AWS region for tests.
///
/// Checks environment variables in order:
/// 1. AWS_REGION
/// 2. AWS_DEFAULT_REGION
/// 3. Falls back to us-east-1
pub fn get_test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| "us-east-1".to_string())
}

/// Generate a unique canary name for test resources.
///
/// Synthetics limits canary names to 21 lowercase characters, so the name
/// is `t-` followed by the low digits of the millisecond timestamp and a
/// per-process counter.
pub fn test_canary_name() -> String {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let ts = Utc::now().timestamp_millis() % 10_000_000_000;
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed) % 1000;
    format!("t-{ts}-{counter}")
}

/// Artifact bucket used by live tests (must already exist)
pub fn test_artifact_bucket() -> Option<String> {
    std::env::var("CANARY_TEST_BUCKET").ok()
}
