use clap::Parser;
use std::path::PathBuf;
use tablesmith_core::TablesmithConfig;
use tablesmith_service::BuilderService;

mod commands;

use commands::Command;

#[derive(Parser, Debug)]
#[command(name = "tablesmith")]
#[command(version)]
#[command(about = "Browse database metadata and stage code generation parameters")]
#[command(long_about = "Browse database metadata and stage code generation parameters

Results are printed as JSON on stdout, logs go to stderr (RUST_LOG controls
the level).

Passwords are never stored on disk. They are read from
TABLESMITH_PASSWORD_<ID>, where <ID> is the connection id upper-cased with
every other character replaced by '_'.

EXAMPLES:
  tablesmith connections add --driver sqlite --database ./shop.db --id shop
  tablesmith tables shop dummy
  tablesmith stage --connection shop --table dummy.orders --model-package com.example.model
  tablesmith history")]
struct Cli {
    /// Configuration file (defaults to tablesmith.toml in this or a parent directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TablesmithConfig::load_from(path)?,
        None => TablesmithConfig::load()?,
    };

    if let Err(e) = tablesmith_telemetry::init_telemetry(&config.observability) {
        eprintln!("Warning: Could not initialize logging: {}", e);
    }

    let service = BuilderService::from_config(&config);
    let output = commands::run(&service, cli.command).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
