#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::style)]

use std::io::Read;

use anyhow::{Context, bail};
use clap::Parser;
use sub2clash::cli::Args;
use sub2clash::generator::build_config;
use sub2clash::parser::parse_subscription;
use tracing::Level;

fn main() {
    let args = Args::parse();
    let is_verbose = args.verbose;
    tracing_subscriber::fmt()
        .with_max_level(if is_verbose {
            Level::TRACE
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        tracing::error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read subscription from stdin")?;

    let input = input.trim();
    if input.is_empty() {
        bail!("no input provided");
    }

    let outcome = parse_subscription(input);
    if outcome.proxies.is_empty() {
        bail!("no valid proxies found in input");
    }
    tracing::info!("Found {} proxies", outcome.proxies.len());

    let config = build_config(outcome.proxies);
    let yaml = config.to_yaml().context("Failed to serialize config")?;

    match args.output.as_deref() {
        Some(path) => {
            std::fs::write(path, &yaml)
                .with_context(|| format!("Failed to write config to {}", path))?;
            tracing::info!("Config written to {}", path);
        }
        None => print!("{}", yaml),
    }

    Ok(())
}
