// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialtone - reliable delivery of feedback and usage reports.
//!
//! This is the binary entry point. One-shot subcommands record or flush
//! reports and exit; `serve` keeps the periodic scheduler running until a
//! shutdown signal arrives.

mod commands;
mod serve;
mod shutdown;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dialtone_config::DialtoneConfig;
use dialtone_core::DialtoneError;
use dialtone_metrics::ChannelKind;

/// Dialtone - reliable delivery of feedback and usage reports.
#[derive(Parser, Debug)]
#[command(name = "dialtone", version, about, long_about = None)]
struct Cli {
    /// Load this file (plus DIALTONE_* overrides) instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Record a feedback report and try to deliver the queue.
    Feedback {
        /// The user was happy with the call.
        #[arg(long, conflicts_with = "sad", required_unless_present = "sad")]
        happy: bool,
        /// The user was not happy with the call.
        #[arg(long)]
        sad: bool,
        /// Description text; repeat to send a list of items.
        #[arg(long, short = 'd', value_name = "TEXT")]
        description: Vec<String>,
        /// URL of the call the feedback is about.
        #[arg(long)]
        url: Option<String>,
    },
    /// Bump a URL usage counter.
    UrlUsage {
        #[arg(value_parser = ["generated", "shared"])]
        counter: String,
    },
    /// Deliver queued feedback and send the URL usage snapshot now.
    Flush,
    /// Show queue and delivery state of every channel.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Run the periodic reporter in the foreground.
    Serve,
    /// Drop everything queued in one category.
    Clear {
        /// `feedback` or `url-usage`.
        kind: ChannelKind,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            dialtone_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    serve::init_tracing(&config.logging.level);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<DialtoneConfig, Vec<dialtone_config::ConfigError>> {
    match path {
        Some(path) => dialtone_config::load_and_validate_path(path),
        None => dialtone_config::load_and_validate(),
    }
}

async fn run(command: Commands, config: DialtoneConfig) -> Result<(), DialtoneError> {
    match command {
        Commands::Feedback {
            happy,
            sad: _,
            description,
            url,
        } => commands::run_feedback(&config, happy, description, url).await,
        Commands::UrlUsage { counter } => commands::run_url_usage(&config, &counter).await,
        Commands::Flush => commands::run_flush(&config).await,
        Commands::Status { json, plain } => status::run_status(&config, json, plain).await,
        Commands::Serve => serve::run_serve(config).await,
        Commands::Clear { kind } => commands::run_clear(&config, kind).await,
    }
}
