// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Menu → inline keyboard conversion.

use crate::menu::Menu;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub fn keyboard(menu: &Menu) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(menu.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.callback.data()))
            .collect::<Vec<_>>()
    }))
}
