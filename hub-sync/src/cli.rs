//! CLI surface for hub-sync: command parsing and the async [`run`] entry point.
//!
//! All pipeline logic lives in `hub-sync-core`; this module only loads
//! configuration, builds the GitHub store client and prints progress.
use crate::github::GithubReleaseClient;
use crate::load_config::load_config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use hub_sync_core::synchronise::{plan, synchronise, SyncOutcome, SynchroniseReport};
use std::path::PathBuf;

/// CLI for hub-sync: publish missing hub packages and refresh the index.
#[derive(Parser)]
#[clap(
    name = "hub-sync",
    version,
    about = "Publish missing hub packages to GitHub Releases and regenerate the package index"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Archive and upload every package missing from the release, then rebuild the index
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Actually upload (overrides the config file and PUBLISH)
        #[clap(long)]
        publish: bool,
    },
    /// Show which packages are missing from the release without changing anything
    Plan {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync { config, publish } => {
            let mut config = load_config(config)?;
            if publish {
                config.sync.publish = true;
            }
            config.sync.trace_loaded();
            let store = GithubReleaseClient::new_from_env(&config.github, config.sync.remote_timeout)
                .map_err(|e| anyhow::anyhow!("Cannot create GitHub client: {e}"))?;

            println!("Reading packages from repository...");
            match synchronise(&config.sync, &store).await {
                Ok(report) => {
                    print_report(&report);
                    tracing::info!(command = "sync", ?report, "Synchronisation complete");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "sync", error = %e, "Synchronisation failed");
                    Err(anyhow::Error::new(e).context("Synchronisation failed"))
                }
            }
        }
        Commands::Plan { config } => {
            let config = load_config(config)?;
            config.sync.trace_loaded();
            let store = GithubReleaseClient::new_from_env(&config.github, config.sync.remote_timeout)
                .map_err(|e| anyhow::anyhow!("Cannot create GitHub client: {e}"))?;

            let plan = plan(&config.sync, &store)
                .await
                .map_err(|e| anyhow::Error::new(e).context("Planning failed"))?;
            if plan.worklist.is_empty() {
                println!("Packages are already up-to-date");
            } else {
                println!("Packages to publish:");
                for package in &plan.worklist {
                    println!("--> {}", package.identity_key());
                }
            }
            tracing::info!(
                command = "plan",
                local = plan.catalog.len(),
                missing = plan.worklist.len(),
                "Plan complete"
            );
            Ok(())
        }
    }
}

fn print_report(report: &SynchroniseReport) {
    if report.outcome == SyncOutcome::UpToDate {
        println!("Packages are already up-to-date");
        return;
    }

    println!();
    println!("Packages to publish:");
    for package in &report.published {
        println!("--> {}", package.identity);
        println!("Created archive {}, hash: {}", package.archive, package.sha256);
        if package.uploaded {
            println!("Uploaded to GitHub Releases");
        } else {
            println!("Dry run, not uploaded");
        }
    }

    if let Some(index) = &report.index {
        println!();
        println!(
            "Index rebuilt with {} package(s){}",
            index.entries,
            if index.uploaded { "" } else { " (dry run, not uploaded)" }
        );
    }
    println!("Done!");
}
