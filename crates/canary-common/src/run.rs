//! Canary run records
//!
//! Runs are read-only data sourced from the synthetics service. Reporting
//! always orders them by completion time, most recent first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// A single execution of a canary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanaryRun {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Terminal status such as `PASSED` or `FAILED`
    pub status: Option<String>,
    pub status_reason: Option<String>,
    pub started: Option<DateTime<Utc>>,
    pub completed: Option<DateTime<Utc>>,
    /// `<bucket>/<key prefix>` holding screenshots, HAR files and logs
    pub artifact_location: Option<String>,
}

impl CanaryRun {
    /// Split the artifact location into `(bucket, key prefix)`
    pub fn artifact_bucket_and_prefix(&self) -> Option<(&str, &str)> {
        let location = self.artifact_location.as_deref()?;
        let location = location.strip_prefix("s3://").unwrap_or(location);
        match location.split_once('/') {
            Some((bucket, prefix)) if !bucket.is_empty() => Some((bucket, prefix)),
            None if !location.is_empty() => Some((location, "")),
            _ => None,
        }
    }
}

/// Order runs by completion time descending and keep at most `limit`.
///
/// Runs that have not completed sort after every completed run.
pub fn most_recent_runs(mut runs: Vec<CanaryRun>, limit: usize) -> Vec<CanaryRun> {
    runs.sort_by_key(|run| (run.completed.is_none(), Reverse(run.completed)));
    runs.truncate(limit);
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn run_completed_at(id: &str, minute: Option<u32>) -> CanaryRun {
        CanaryRun {
            id: Some(id.to_string()),
            name: Some("c1".to_string()),
            status: Some("PASSED".to_string()),
            status_reason: None,
            started: None,
            completed: minute.map(|m| Utc.with_ymd_and_hms(2024, 1, 1, 12, m, 0).unwrap()),
            artifact_location: None,
        }
    }

    fn ids(runs: &[CanaryRun]) -> Vec<&str> {
        runs.iter().map(|r| r.id.as_deref().unwrap()).collect()
    }

    #[test]
    fn test_most_recent_first() {
        let runs = vec![
            run_completed_at("a", Some(1)),
            run_completed_at("c", Some(3)),
            run_completed_at("b", Some(2)),
        ];
        assert_eq!(ids(&most_recent_runs(runs, 5)), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_limit_applied() {
        let runs = (0..12)
            .map(|m| run_completed_at(&format!("r{m}"), Some(m)))
            .collect();
        let recent = most_recent_runs(runs, 5);
        assert_eq!(ids(&recent), vec!["r11", "r10", "r9", "r8", "r7"]);
    }

    #[test]
    fn test_incomplete_runs_sort_last() {
        let runs = vec![
            run_completed_at("pending", None),
            run_completed_at("old", Some(1)),
            run_completed_at("new", Some(30)),
        ];
        assert_eq!(ids(&most_recent_runs(runs, 5)), vec!["new", "old", "pending"]);
    }

    #[test]
    fn test_artifact_bucket_and_prefix() {
        let mut run = run_completed_at("a", Some(1));
        run.artifact_location = Some("b1/canary/us-east-1/c1/2024/01/01/12/00".to_string());
        assert_eq!(
            run.artifact_bucket_and_prefix(),
            Some(("b1", "canary/us-east-1/c1/2024/01/01/12/00"))
        );

        run.artifact_location = Some("s3://b1/c1/run".to_string());
        assert_eq!(run.artifact_bucket_and_prefix(), Some(("b1", "c1/run")));

        run.artifact_location = None;
        assert_eq!(run.artifact_bucket_and_prefix(), None);
    }
}
