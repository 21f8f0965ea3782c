// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DelayDesk - admin REST API for transit delay reports.
//!
//! This is the binary entry point.

mod seed;
mod serve;
mod shutdown;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

/// DelayDesk - admin REST API for transit delay reports.
#[derive(Parser, Debug)]
#[command(name = "delaydesk", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server.
    Serve,
    /// Fill the database with random sample delay reports.
    Seed {
        /// Number of reports to insert.
        #[arg(long, default_value_t = 50)]
        count: usize,
        /// Keep existing reports instead of clearing the table first.
        #[arg(long)]
        keep: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match delaydesk_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            delaydesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Seed { count, keep }) => seed::run_seed(config, count, keep).await,
        Some(Commands::Config) => {
            match toml::to_string_pretty(&config) {
                Ok(rendered) => print!("{rendered}"),
                Err(e) => {
                    eprintln!("error: failed to render configuration: {e}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        None => {
            println!("delaydesk: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
