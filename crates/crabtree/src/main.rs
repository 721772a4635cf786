// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crabtree - a small storefront backend.
//!
//! This is the binary entry point: the HTTP server, a local cart driver and
//! environment diagnostics.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod cart;
mod doctor;
mod serve;
mod shutdown;

use clap::{Parser, Subcommand};

/// Crabtree - a small storefront backend.
#[derive(Parser, Debug)]
#[command(name = "crabtree", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the storefront HTTP server.
    Serve,
    /// Inspect or change the local cart.
    Cart {
        #[command(subcommand)]
        action: cart::CartCommand,
    },
    /// Run diagnostic checks against the environment.
    Doctor {
        /// Also run slower checks (integrity, migrations, memory).
        #[arg(long)]
        deep: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match crabtree_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            crabtree_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Cart { action }) => cart::run_cart(&config, action).await,
        Some(Commands::Doctor { deep, plain }) => doctor::run_doctor(&config, deep, plain).await,
        None => {
            println!("crabtree: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("crabtree: {e}");
        std::process::exit(1);
    }
}
