//! Runtime settings for the component binary

use crate::wait::PollConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Time to let a freshly attached IAM policy propagate before the role is
/// handed to the synthetics service.
pub const DEFAULT_IAM_PROPAGATION_DELAY: Duration = Duration::from_secs(6);

/// How clients reach AWS
#[derive(Debug, Clone, Default)]
pub struct AwsSettings {
    /// AWS profile name (overrides default credential resolution)
    pub profile: Option<String>,
    /// Alternate endpoint, e.g. a LocalStack URL
    pub endpoint_url: Option<String>,
}

/// Settings that apply to every subcommand
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    /// Key the recorded state is stored under; also seeds generated names
    pub instance: String,
    pub aws: AwsSettings,
    /// State database path, platform data directory when unset
    pub state_db: Option<PathBuf>,
    pub poll: PollConfig,
    pub iam_propagation_delay: Duration,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            instance: "canary".to_string(),
            aws: AwsSettings::default(),
            state_db: None,
            poll: PollConfig::default(),
            iam_propagation_delay: DEFAULT_IAM_PROPAGATION_DELAY,
        }
    }
}
