//! Blockmirror CLI - block mirroring plan generator
//!
//! Reads an ordered host list, captures the live segment topology, and
//! writes a relocation plan that moves every segment mirror onto a host in
//! the same block.
//!
//! Usage:
//!   blockmirror-cli --hostfile hosts.txt --block-size 4 --output mirror_plan

mod hostfile;

use anyhow::{Context, Result};
use blockmirror_plan::PlanRun;
use blockmirror_store::PgTopologyStore;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "blockmirror-cli")]
#[command(about = "Block mirroring plan generator")]
#[command(version)]
struct Args {
    /// Ordered host list file (one hostname per line; order defines block
    /// membership)
    #[arg(short = 'f', long)]
    hostfile: PathBuf,

    /// Number of hosts per block (typically one rack)
    #[arg(short, long)]
    block_size: usize,

    /// Database connection URL for the cluster catalog
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Path to write the relocation plan to
    #[arg(short, long, default_value = "mirror_plan")]
    output: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let hosts = hostfile::read_host_list(&args.hostfile)?;
    info!(hosts = hosts.len(), hostfile = %args.hostfile.display(), "host list loaded");

    let store = PgTopologyStore::connect(&args.database_url)
        .context("failed to set up database connection")?;

    let run = PlanRun::new().context("failed to create run scratch directory")?;
    let path = run
        .execute(&store, &hosts, args.block_size, &args.output)
        .await
        .context("plan generation failed")?;

    println!("mirror relocation plan written to {}", path.display());
    Ok(())
}
