//! canary-component: manage an AWS CloudWatch Synthetics canary from a manifest
//!
//! Recorded state is kept in a local SQLite database keyed by instance name,
//! so successive invocations update, inspect and finally remove the same
//! canary.

use anyhow::{Context, Result};
use canary_common::defaults::DEFAULT_REGION;
use canary_common::{CanaryConfig, CanaryInputs, RecordedState};
use canary_component::CanaryComponent;
use canary_component::aws::{AwsContext, AwsGateway};
use canary_component::config::{AwsSettings, RuntimeSettings};
use canary_component::package::ZipPackager;
use canary_component::state::{self, DbPool};
use canary_component::wait::PollConfig;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "canary-component")]
#[command(about = "Provision and operate an AWS CloudWatch Synthetics canary")]
#[command(version)]
struct Args {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct GlobalArgs {
    /// Instance name the recorded state is stored under
    #[arg(long, global = true, env = "CANARY_INSTANCE", default_value = "canary")]
    instance: String,

    /// AWS profile to use
    #[arg(long, global = true, env = "AWS_PROFILE")]
    aws_profile: Option<String>,

    /// Alternate AWS endpoint (e.g. LocalStack)
    #[arg(long, global = true, env = "CANARY_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// State database path (default: platform data directory)
    #[arg(long, global = true, env = "CANARY_STATE_DB")]
    state_db: Option<PathBuf>,

    /// Seconds between status polls
    #[arg(long, global = true, default_value = "1")]
    poll_interval_secs: u64,

    /// Give up waiting for the canary after this many seconds
    #[arg(long, global = true, default_value = "900")]
    poll_timeout_secs: u64,
}

impl From<GlobalArgs> for RuntimeSettings {
    fn from(args: GlobalArgs) -> Self {
        RuntimeSettings {
            instance: args.instance,
            aws: AwsSettings {
                profile: args.aws_profile,
                endpoint_url: args.endpoint_url,
            },
            state_db: args.state_db,
            poll: PollConfig {
                interval: Duration::from_secs(args.poll_interval_secs),
                timeout: Duration::from_secs(args.poll_timeout_secs),
            },
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or update the canary described by a manifest
    Deploy {
        /// JSON manifest with the canary inputs
        #[arg(long)]
        inputs: PathBuf,
    },

    /// Delete the canary and every resource created for it
    Remove,

    /// Start the canary
    Start,

    /// Stop the canary
    Stop,

    /// Show the most recent runs
    Results,

    /// Show the log of the most recent run
    Logs,

    /// Print the recorded state
    State,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

fn init_logging() -> Result<()> {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    for target in ["aws_config", "aws_smithy_runtime", "aws_sdk_synthetics", "aws_sdk_iam"] {
        filter = filter.add_directive(format!("{target}=warn").parse()?);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Read a manifest, resolving a relative `src` against the manifest's directory
fn read_inputs(path: &Path) -> Result<CanaryInputs> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let mut inputs = CanaryInputs::from_json(&json)
        .with_context(|| format!("Invalid manifest {}", path.display()))?;

    if let (Some(src), Some(dir)) = (inputs.src.as_deref(), path.parent()) {
        if Path::new(src).is_relative() {
            inputs.src = Some(dir.join(src).display().to_string());
        }
    }

    Ok(inputs)
}

async fn component_for(
    settings: &RuntimeSettings,
    region: &str,
) -> CanaryComponent<AwsGateway, ZipPackager> {
    let ctx = AwsContext::new(
        region,
        settings.aws.profile.as_deref(),
        settings.aws.endpoint_url.as_deref(),
    )
    .await;

    CanaryComponent::new(AwsGateway::from_context(&ctx), ZipPackager)
        .with_poll_config(settings.poll)
        .with_iam_propagation_delay(settings.iam_propagation_delay)
}

/// Region a deployed canary lives in
fn recorded_region(prior: &RecordedState) -> &str {
    prior.region.as_deref().unwrap_or(DEFAULT_REGION)
}

async fn save_status(
    pool: &DbPool,
    settings: &RuntimeSettings,
    mut prior: RecordedState,
    status: Option<canary_common::CanaryState>,
) -> Result<()> {
    match status {
        Some(status) => {
            prior.status = Some(status);
            state::save_state(pool, &settings.instance, &prior).await?;
            print_json(&serde_json::json!({ "status": status }))
        }
        None => print_json(&serde_json::json!({})),
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let command = args.command;
    let settings = RuntimeSettings::from(args.global);

    let pool = state::open_db(settings.state_db.as_deref()).await?;
    let prior = state::load_state(&pool, &settings.instance).await?;

    match command {
        Command::Deploy { inputs } => {
            let inputs = read_inputs(&inputs)?;
            let config = CanaryConfig::resolve(inputs, &prior, &settings.instance);
            info!(canary = %config.name, region = %config.region, "Deploying canary");

            let component = component_for(&settings, &config.region).await;
            let new_state = component.deploy(&config, &prior).await?;
            state::save_state(&pool, &settings.instance, &new_state).await?;
            print_json(&new_state)?;
        }

        Command::Remove => {
            let component = component_for(&settings, recorded_region(&prior)).await;
            component.remove(&prior).await?;
            state::clear_state(&pool, &settings.instance).await?;
            print_json(&serde_json::json!({}))?;
        }

        Command::Start => {
            let component = component_for(&settings, recorded_region(&prior)).await;
            let status = component.start(&prior).await?;
            save_status(&pool, &settings, prior, status).await?;
        }

        Command::Stop => {
            let component = component_for(&settings, recorded_region(&prior)).await;
            let status = component.stop(&prior).await?;
            save_status(&pool, &settings, prior, status).await?;
        }

        Command::Results => {
            let component = component_for(&settings, recorded_region(&prior)).await;
            let runs = component.results(&prior).await?;
            print_json(&serde_json::json!({ "runs": runs }))?;
        }

        Command::Logs => {
            let component = component_for(&settings, recorded_region(&prior)).await;
            match component.logs(&prior).await? {
                Some(log) => print_json(&log)?,
                None => print_json(&serde_json::json!({}))?,
            }
        }

        Command::State => print_json(&prior)?,
    }

    Ok(())
}
