// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! DevLotFL lot bot - manage FunPay lots from Telegram.

mod account;
mod config;
mod controller;
mod lots;
mod menu;
mod telegram;

use account::{FunPayAccount, LotAccount};
use anyhow::{anyhow, Context};
use clap::Parser;
use config::{Config, LOTS_CONFIG_FILE, NAME, VERSION};
use controller::LotController;
use lots::LotStore;
use std::path::PathBuf;
use std::sync::Arc;
use telegram::{BotContext, InputStates, TelegramNotifier};
use teloxide::prelude::*;
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "lot-bot", version, author = config::AUTHOR, about = config::DESCRIPTION)]
struct Cli {
    /// Directory holding lots_config.json (overrides LOTS_STORAGE_DIR).
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Fetch one lot from FunPay, print its status and exit.
    #[arg(long, value_name = "ID")]
    check_lot: Option<u64>,

    /// Print the stored lot lists and exit.
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    if cli.list {
        let dir = cli.storage_dir.clone().unwrap_or_else(config::storage_dir_from_env);
        let store = LotStore::new(dir.join(LOTS_CONFIG_FILE));
        let lots = store.load().map_err(|e| anyhow!(e))?;
        info!("📋 {} ({})", store.path().display(), lots.all().len());
        info!("🟢 Active: {}", lots.active_lots.join(", "));
        info!("🔴 Inactive: {}", lots.inactive_lots.join(", "));
        return Ok(());
    }

    let mut config = Config::from_env()
        .map_err(|e| anyhow!(e))
        .context("Failed to load config")?;
    if let Some(dir) = cli.storage_dir {
        config.storage_dir = dir;
    }

    let account = Arc::new(
        FunPayAccount::new(&config.base_url, &config.golden_key, &config.user_agent)
            .map_err(|e| anyhow!(e))?,
    );

    if let Some(lot_id) = cli.check_lot {
        info!("🧪 Checking lot {}", lot_id);
        match account.get_lot_fields(lot_id).await.map_err(|e| anyhow!(e))? {
            Some(fields) => info!(
                "📊 Lot {}: active={}, {} form fields",
                lot_id,
                fields.active,
                fields.fields.len()
            ),
            None => warn!("Lot {} not found on FunPay", lot_id),
        }
        return Ok(());
    }

    info!("🚀 {} v{} starting...", NAME, VERSION);
    info!("💾 Lots file: {}", config.lots_file().display());

    match account.init().await {
        Ok(user_id) => info!("👤 FunPay user: {}", user_id),
        Err(e) => error!("❌ FunPay login failed, will retry on first request: {}", e),
    }

    let store = LotStore::new(config.lots_file());
    match store.load() {
        Ok(lots) => info!(
            "📊 Loaded {} active / {} inactive lots",
            lots.active_lots.len(),
            lots.inactive_lots.len()
        ),
        Err(e) => error!("❌ {}", e),
    }

    let account: Arc<dyn LotAccount> = account;
    let ctx = Arc::new(BotContext {
        controller: LotController::new(store, account),
        states: InputStates::new(),
        config: config.clone(),
    });

    let bot = Bot::new(config.telegram_token.clone());
    if let Err(e) = telegram::register_commands(&bot).await {
        warn!("Failed to register bot commands: {}", e);
    }

    let notifier = TelegramNotifier::new(bot.clone(), &config.admin_ids);
    info!("Loaded {} ({})", NAME, VERSION);
    notifier
        .send_message(&format!("🚀 {} v{} started. Use /lots", NAME, VERSION))
        .await;

    let mut dispatcher = Dispatcher::builder(bot, telegram::schema())
        .dependencies(dptree::deps![ctx])
        .default_handler(|upd| async move {
            debug!("Unhandled update {:?}", upd.id);
        })
        .build();

    let shutdown = dispatcher.shutdown_token();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("🛑 Shutdown signal received, stopping dispatcher...");
            match shutdown.shutdown() {
                Ok(done) => done.await,
                Err(e) => warn!("Dispatcher was not running: {:?}", e),
            }
        }
    });

    info!("✅ Bot ready! Waiting for /lots...");
    dispatcher.dispatch().await;

    notifier
        .send_message(&format!("🛑 {} shutting down", NAME))
        .await;
    Ok(())
}
