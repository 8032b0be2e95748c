use clap::Parser;
use config::Config;
use tracing_subscriber::EnvFilter;

mod chart;
mod clean;
mod compute;
mod config;
mod console;
mod data;
mod pipeline;
mod read;
mod report;
mod write;

fn main() -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = Config::parse();
    pipeline::run(&config)?;
    Ok(())
}
