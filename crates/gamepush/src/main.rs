// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gamepush - weekly free-game promotion notifier.
//!
//! This is the binary entry point: CLI parsing, configuration loading, and
//! dispatch to the `serve` daemon or one-shot management commands.

mod app;
mod commands;
mod extract;
mod handlers;
mod serve;
mod server;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gamepush_core::{ConfirmAction, ContactType, DeliveryStatus, PromotionWindow};

/// Gamepush - weekly free-game promotion notifier.
#[derive(Parser, Debug)]
#[command(name = "gamepush", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the default locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scheduler and the management HTTP surface.
    Serve,
    /// Fetch the storefront catalog into the promotion cache.
    Refresh,
    /// Run one dispatch pass for a promotion window.
    Dispatch {
        /// `current` or `next`.
        window: PromotionWindow,
    },
    /// Re-send every failed delivery.
    Retry,
    /// Apply a confirmation action to a subscriber's latest push for a game.
    Confirm {
        subscriber_id: i64,
        slug: String,
        /// `confirmed` or `claimed`.
        action: ConfirmAction,
    },
    /// Manage subscribers.
    Subscriber {
        #[command(subcommand)]
        command: SubscriberCommand,
    },
    /// Print the effective configuration with credentials masked.
    Config,
    /// List push logs, newest first.
    Logs {
        #[arg(long)]
        subscriber: Option<i64>,
        /// `success` or `failed`.
        #[arg(long)]
        status: Option<DeliveryStatus>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Subcommand, Debug)]
enum SubscriberCommand {
    /// Register a subscriber.
    Add {
        #[arg(long)]
        epic_account: String,
        /// `wechat_official` or `qq`.
        #[arg(long)]
        contact_type: ContactType,
        #[arg(long)]
        contact_id: String,
    },
    /// List all subscribers.
    List,
    /// Remove a subscriber. Its push logs are kept.
    Remove { id: i64 },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => gamepush_config::load_and_validate_path(path),
        None => gamepush_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            gamepush_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    serve::init_tracing(&config.service.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Refresh) => commands::refresh(&config).await,
        Some(Commands::Dispatch { window }) => commands::dispatch(&config, window).await,
        Some(Commands::Retry) => commands::retry(&config).await,
        Some(Commands::Confirm {
            subscriber_id,
            slug,
            action,
        }) => commands::confirm(&config, subscriber_id, &slug, action).await,
        Some(Commands::Subscriber { command }) => match command {
            SubscriberCommand::Add {
                epic_account,
                contact_type,
                contact_id,
            } => commands::subscriber_add(&config, epic_account, contact_type, contact_id).await,
            SubscriberCommand::List => commands::subscriber_list(&config).await,
            SubscriberCommand::Remove { id } => commands::subscriber_remove(&config, id).await,
        },
        Some(Commands::Logs {
            subscriber,
            status,
            limit,
        }) => commands::logs(&config, subscriber, status, limit).await,
        Some(Commands::Config) => commands::show_config(&config),
        None => {
            println!("gamepush: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
