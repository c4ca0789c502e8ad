// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Telegram notifier module.

use teloxide::prelude::*;
use tracing::{error, info};

/// Broadcasts service messages to the configured admins.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat_ids: Vec<ChatId>,
}

impl TelegramNotifier {
    /// Admins are notified in their private chats, whose id equals the user id.
    pub fn new(bot: Bot, admin_ids: &[u64]) -> Self {
        info!(
            "📱 Initializing Telegram notifier: {} recipient(s)",
            admin_ids.len()
        );

        let chat_ids = admin_ids
            .iter()
            .filter_map(|id| i64::try_from(*id).ok().map(ChatId))
            .collect();

        Self { bot, chat_ids }
    }

    pub async fn send_message(&self, message: &str) {
        for chat_id in &self.chat_ids {
            match self.bot.send_message(*chat_id, message).await {
                Ok(_) => info!("📤 Sent Telegram message to {}", chat_id),
                Err(e) => error!("Failed to send Telegram message to {}: {}", chat_id, e),
            }
        }
    }
}
