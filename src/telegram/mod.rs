// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Telegram front end: dispatcher, keyboards, input mode and notifications.

pub mod handlers;
pub mod notifier;
pub mod render;
pub mod state;

pub use handlers::{register_commands, schema, BotContext};
pub use notifier::TelegramNotifier;
pub use state::InputStates;
