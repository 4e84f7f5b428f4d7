//! Pipesync CLI
//!
//! Pushes pipeline definitions kept in a repository to the remote pipeline
//! service. Given the files a commit added, changed or deleted, it works out
//! which pipelines to create, update or delete, applies those changes and
//! writes the identifiers the service assigns back into the definition files.

mod artifact;
mod classifier;
mod config;
mod outputs;
mod reconciler;
mod repository;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repository::HttpPipelineRepository;
use pipesync_client::OrchestratorClient;

#[derive(Parser)]
#[command(name = "pipesync")]
#[command(about = "Push pipeline definitions to the remote pipeline service", long_about = None)]
struct Cli {
    /// Files that were deleted (`.yaml`, `.yml`, `.py` or `requirements.txt`)
    #[arg(short = 'd', long, num_args = 1..)]
    files_deleted: Vec<PathBuf>,

    /// Files with changes (`.yaml`, `.yml`, `.py` or `requirements.txt`)
    #[arg(short = 'a', long, num_args = 1..)]
    files_changed: Vec<PathBuf>,

    /// Repository root directory
    #[arg(long, default_value = ".")]
    root_dir: PathBuf,

    /// Directory with your pipeline definitions
    #[arg(long, default_value = "pipelines")]
    pipelines_dir: PathBuf,

    /// Personal access token
    #[arg(short = 't', long, env = "PIPESYNC_ACCESS_TOKEN", hide_env_values = true)]
    personal_access_token: Option<String>,

    /// Base URL of the remote service
    #[arg(long, env = "PIPESYNC_API_URL", default_value = pipesync_client::DEFAULT_API_URL)]
    api_url: String,

    /// File receiving `key=value` outputs
    #[arg(long, env = "GITHUB_OUTPUT")]
    output_file: Option<PathBuf>,

    /// Report the changes without applying them
    #[arg(long)]
    dry_run: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            files_changed: cli.files_changed,
            files_deleted: cli.files_deleted,
            root_dir: cli.root_dir,
            pipelines_dir: cli.pipelines_dir,
            access_token: cli.personal_access_token,
            api_url: cli.api_url,
            output_file: cli.output_file,
            dry_run: cli.dry_run,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pipesync=info,pipesync_yaml=info,pipesync_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from(Cli::parse());
    config.validate()?;

    run(&config).await
}

async fn run(config: &Config) -> Result<()> {
    let pipelines_dir = config.pipelines_path();
    info!(
        "Syncing {} changed and {} deleted file(s) under {}",
        config.files_changed.len(),
        config.files_deleted.len(),
        pipelines_dir.display()
    );

    let changes = classifier::classify(
        &config.changed_paths(),
        &config.deleted_paths(),
        &pipelines_dir,
        config.dry_run,
    )
    .context("Failed to classify changed files")?;

    outputs::print_summary(&changes);
    if let Some(path) = &config.output_file {
        outputs::write_outputs(path, &outputs::plan_outputs(&changes))?;
    }

    // Dry runs never reach the client, so a missing token is fine there
    let token = config.access_token.clone().unwrap_or_default();
    let client = OrchestratorClient::new(&config.api_url, token);
    tracing::debug!("Remote service at {}", client.base_url());
    let repo = HttpPipelineRepository::new(client);
    let summary = reconciler::apply(changes, &repo, config.dry_run).await?;

    outputs::print_result(&summary);
    if let Some(path) = &config.output_file {
        outputs::write_outputs(path, &outputs::result_outputs(&summary))?;
    }

    Ok(())
}
