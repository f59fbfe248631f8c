//! davit - publish a forge release and hoist local files onto it as assets.
//!
//! Configuration comes entirely from the environment (GitHub Actions
//! `INPUT_*` conventions); there are no command-line arguments. On success
//! the release coordinates and uploaded assets are reported through
//! `GITHUB_OUTPUT`; any fatal condition becomes a single error line and a
//! nonzero exit status.

mod env;
mod files;
mod outputs;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use davit_forge::{GithubOptions, GithubReleaser, Releaser, Throttled};
use davit_release::run;

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(error) = try_main().await {
        // One human-readable message for the first fatal condition.
        tracing::error!("{error:#}");
        std::process::exit(1);
    }
}

async fn try_main() -> Result<()> {
    let config = env::config_from_env(std::env::vars())?;
    let discovered = files::discover(&config.files);

    let (owner, repo) = config
        .repository
        .split_once('/')
        .context("repository must be an owner/repo slug")?;
    let releaser: Arc<dyn Releaser> = Arc::new(Throttled::new(GithubReleaser::new(
        GithubOptions::new(config.token.clone(), owner, repo),
    )));

    let outputs = run(releaser, &config, &discovered).await?;

    match std::env::var_os("GITHUB_OUTPUT") {
        Some(path) => outputs::write_outputs(Path::new(&path), &outputs)?,
        None => outputs::log_outputs(&outputs),
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}
