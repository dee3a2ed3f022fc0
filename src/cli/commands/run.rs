//! `vigil run` - the supervisor loop.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::ports::GenerateError;
use crate::infrastructure::collaborators::{
    ApiInstructionGenerator, CommandActionExecutor, CommandScreenSource,
};
use crate::infrastructure::config::{load_regions, ConfigLoader};
use crate::infrastructure::logging;
use crate::infrastructure::status_journal::StatusJournal;
use crate::services::Supervisor;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Load configuration from this file instead of the .vigil hierarchy
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let _log_guard = logging::init(&config.logging)?;

    let regions = load_regions(&config.capture.region_file).with_context(|| {
        format!(
            "no usable region configuration at {} (run `vigil init` first)",
            config.capture.region_file
        )
    })?;
    let Some(region) = regions.first().copied() else {
        bail!("region configuration is empty");
    };
    if regions.len() > 1 {
        warn!(
            configured = regions.len(),
            "multiple regions configured, supervising the first one"
        );
    }
    info!(%region, "monitoring region loaded");

    let journal = StatusJournal::new(&config.journal, &config.markers);
    journal
        .cleanup()
        .context("Failed to clean the status journal")?;

    let source = CommandScreenSource::new(&config.capture);
    let executor = CommandActionExecutor::new(&config.executor);
    let generator = match ApiInstructionGenerator::new(&config.generator) {
        Ok(generator) => generator,
        Err(GenerateError::NotConfigured(detail)) => {
            bail!("instruction generator is not configured: {detail}")
        }
        Err(err) => return Err(err).context("Failed to build the instruction generator"),
    };

    let mut supervisor = Supervisor::new(
        &config,
        region,
        source,
        generator,
        executor,
        Some(journal),
        Utc::now(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    supervisor.run(shutdown_rx).await;
    Ok(())
}
