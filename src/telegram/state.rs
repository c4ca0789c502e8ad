// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per chat/user input mode.

use std::collections::HashMap;
use teloxide::types::{ChatId, MessageId, UserId};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    /// Next text message is a lot id; `prompt` is the message asking for it.
    AddingLot { prompt: MessageId },
}

#[derive(Debug, Default)]
pub struct InputStates {
    states: Mutex<HashMap<(ChatId, UserId), InputState>>,
}

impl InputStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, chat: ChatId, user: UserId, state: InputState) {
        self.states.lock().await.insert((chat, user), state);
    }

    pub async fn get(&self, chat: ChatId, user: UserId) -> Option<InputState> {
        self.states.lock().await.get(&(chat, user)).copied()
    }

    pub async fn clear(&self, chat: ChatId, user: UserId) -> Option<InputState> {
        self.states.lock().await.remove(&(chat, user))
    }
}
