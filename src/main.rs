// SPDX-License-Identifier: Apache-2.0
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use sonarops::cli::{Cli, Command};
use sonarops::config::Config;
use sonarops::error::SonaropsError;
use sonarops::kubernetes::create_client;
use sonarops::workflow;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env()?;

    match cli.command() {
        Command::Manifest => {
            // Rendering needs no cluster connection
            print!("{}", workflow::render_manifests(&config)?);
        }
        Command::Deploy => {
            let client = create_client().await?;
            workflow::deploy(&client, &config).await?;
        }
        Command::Status => {
            let client = create_client().await?;
            workflow::status(&client, &config).await?;
        }
        Command::Delete => {
            let client = create_client().await?;
            workflow::delete(&client, &config).await?;
        }
    }

    Ok(())
}

/// Missing prerequisites map to distinct exit statuses; everything else is 1
fn exit_code(e: &anyhow::Error) -> i32 {
    e.downcast_ref::<SonaropsError>()
        .map(SonaropsError::exit_code)
        .unwrap_or(1)
}
