// SPDX-FileCopyrightText: 2026 Triago Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Triago - customer chat routing between an assistant and human operators.
//!
//! This is the binary entry point for the Triago service.

mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Triago - customer chat routing between an assistant and human operators.
#[derive(Parser, Debug)]
#[command(name = "triago", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the routing engine on the local console channel.
    Serve,
    /// Print the resolved effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match triago_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            triago_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins; the config's log level is the fallback.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.agent.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run(config).await {
                eprintln!("triago serve: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => print!("{rendered}"),
            Err(e) => {
                eprintln!("triago config: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("triago: use --help for available commands");
        }
    }
}
