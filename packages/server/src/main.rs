#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the solaris API server.

use std::path::PathBuf;

use clap::Parser;
use solaris_server::{ServerConfig, ServerError, run_server};

#[derive(Parser)]
#[command(name = "solaris_server", about = "Urban heat island analysis API server")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, env = "SOLARIS_CONFIG")]
    config: Option<PathBuf>,
    /// Address to bind (overrides config and `BIND_ADDR`)
    #[arg(long)]
    bind_addr: Option<String>,
    /// Port to bind (overrides config and `PORT`)
    #[arg(long)]
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> Result<(), ServerError> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            ServerConfig::load(path)?
        }
        None => ServerConfig::default(),
    };
    config.apply_env()?;

    if let Some(bind_addr) = cli.bind_addr {
        config.server.bind_addr = bind_addr;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    run_server(config).await
}
