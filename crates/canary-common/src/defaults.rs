//! Default configuration values
//!
//! Applied by [`crate::config::CanaryConfig::resolve`] for every field a
//! manifest leaves out.

/// Default canary handler entry point
pub const DEFAULT_HANDLER: &str = "index.handler";

/// Default synthetics runtime version
pub const DEFAULT_RUNTIME: &str = "syn-nodejs-puppeteer-9.1";

/// Default AWS region
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default run timeout in seconds (the platform maximum, 14 minutes)
pub const DEFAULT_TIMEOUT_SECS: i32 = 840;

/// Default schedule duration in seconds (0 = run once per schedule tick)
pub const DEFAULT_SCHEDULE_DURATION_SECS: i64 = 0;

/// Default retention for failed run artifacts, in days
pub const DEFAULT_FAILURE_RETENTION_DAYS: i32 = 31;

/// Default retention for successful run artifacts, in days
pub const DEFAULT_SUCCESS_RETENTION_DAYS: i32 = 31;

/// Length of the random suffix appended to generated canary names
pub const GENERATED_NAME_SUFFIX_LEN: usize = 6;

/// Number of runs reported by `results`
pub const RESULTS_LIMIT: usize = 5;

/// Suffix identifying the plain-text log among a run's artifacts
pub const LOG_OBJECT_SUFFIX: &str = ".txt";
