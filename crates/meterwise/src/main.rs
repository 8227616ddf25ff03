// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Meterwise - conversational assistant for electricity-monitoring subscribers.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod operator;
mod serve;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use meterwise_core::BillingParity;

/// Meterwise - conversational assistant for electricity-monitoring subscribers.
#[derive(Parser, Debug)]
#[command(name = "meterwise", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the webhook gateway (and the Telegram poller when configured).
    Serve,
    /// Validate configuration and report which collaborators are configured.
    Check,
    /// Print the billing cycle containing a date.
    Cycle {
        #[arg(long)]
        cutoff_day: u32,
        /// `even` or `odd`.
        #[arg(long)]
        parity: BillingParity,
        /// Defaults to today in the configured time zone.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Estimate the tax-inclusive cost of a bimonthly consumption.
    Estimate {
        #[arg(long)]
        kwh: f64,
        #[arg(long)]
        tariff: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => meterwise_config::load_and_validate_path(path),
        None => meterwise_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            meterwise_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Check) => {
            print!("{}", check::report(&config));
            Ok(())
        }
        Some(Commands::Cycle {
            cutoff_day,
            parity,
            today,
        }) => operator::cycle(&config, cutoff_day, parity, today).map(|out| print!("{out}")),
        Some(Commands::Estimate { kwh, tariff }) => {
            print!("{}", operator::estimate(&config, kwh, &tariff));
            Ok(())
        }
        None => {
            println!("meterwise: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `meterwise={level},warn`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("meterwise={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
