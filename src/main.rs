//! heapgraph - heap reference graph viewer

mod view_cli;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "heapgraph")]
#[command(about = "Render a heap graph dump, pruned down to fixed-object cycles", version)]
struct Cli {
    /// Heap graph JSON document
    path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = refgraph::ViewConfig::from_env();

    view_cli::run(&cli.path, &config)?;

    Ok(())
}
