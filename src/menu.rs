// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chat menus: callback data codec, button layouts and texts.

use crate::config::{NAME, VERSION};
use crate::lots::{LotStatus, LotsConfig};

const REMOVE_PREFIX: &str = "remove_lot_";
const TOGGLE_PREFIX: &str = "toggle_lot_";

/// Action carried by an inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    AddLot,
    RemoveMenu,
    RemoveLot(String),
    ToggleMenu,
    ToggleLot(String),
    ViewLots,
    BackToMenu,
    Cancel,
}

impl Callback {
    /// Decode callback data. `None` for data this bot does not own.
    pub fn parse(data: &str) -> Option<Self> {
        let callback = match data {
            "add_lot" => Self::AddLot,
            "remove_lot" => Self::RemoveMenu,
            "toggle_lot" => Self::ToggleMenu,
            "view_lots" => Self::ViewLots,
            "back_to_menu" => Self::BackToMenu,
            "cancel" => Self::Cancel,
            _ => {
                if let Some(id) = data.strip_prefix(REMOVE_PREFIX) {
                    Self::RemoveLot(id.to_string())
                } else if let Some(id) = data.strip_prefix(TOGGLE_PREFIX) {
                    Self::ToggleLot(id.to_string())
                } else {
                    return None;
                }
            }
        };
        Some(callback)
    }

    pub fn data(&self) -> String {
        match self {
            Self::AddLot => "add_lot".to_string(),
            Self::RemoveMenu => "remove_lot".to_string(),
            Self::RemoveLot(id) => format!("{}{}", REMOVE_PREFIX, id),
            Self::ToggleMenu => "toggle_lot".to_string(),
            Self::ToggleLot(id) => format!("{}{}", TOGGLE_PREFIX, id),
            Self::ViewLots => "view_lots".to_string(),
            Self::BackToMenu => "back_to_menu".to_string(),
            Self::Cancel => "cancel".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub callback: Callback,
}

impl Button {
    fn new(label: impl Into<String>, callback: Callback) -> Self {
        Self {
            label: label.into(),
            callback,
        }
    }
}

/// Message text with an inline keyboard, independent of the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub text: String,
    pub rows: Vec<Vec<Button>>,
}

/// Which action a lot picker performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Remove,
    Toggle,
}

pub fn main_menu_text() -> String {
    format!("📦 Lot management {} v{}:", NAME, VERSION)
}

pub fn main_menu() -> Menu {
    Menu {
        text: main_menu_text(),
        rows: vec![
            vec![
                Button::new("➕ Add lot", Callback::AddLot),
                Button::new("➖ Remove lot", Callback::RemoveMenu),
            ],
            vec![Button::new("🔄 Change status", Callback::ToggleMenu)],
            vec![Button::new("📋 Lot list", Callback::ViewLots)],
        ],
    }
}

pub fn add_prompt() -> Menu {
    Menu {
        text: "Enter the ID of the lot to add:".to_string(),
        rows: vec![vec![Button::new("❌ Cancel", Callback::Cancel)]],
    }
}

/// One button per stored lot, active lots first, plus a back button.
pub fn lot_picker(config: &LotsConfig, kind: PickerKind) -> Menu {
    let mut rows: Vec<Vec<Button>> = config
        .all()
        .into_iter()
        .map(|(id, status)| {
            let label = format!("{} Lot {}", status_icon(status), id);
            let callback = match kind {
                PickerKind::Remove => Callback::RemoveLot(id),
                PickerKind::Toggle => Callback::ToggleLot(id),
            };
            vec![Button::new(label, callback)]
        })
        .collect();
    rows.push(vec![back_button()]);

    let text = match kind {
        PickerKind::Remove => "Select a lot to remove:",
        PickerKind::Toggle => "Select a lot to change its status:",
    };
    Menu {
        text: text.to_string(),
        rows,
    }
}

pub fn lot_list(config: &LotsConfig) -> Menu {
    let mut text = String::from("📋 Lot list:\n\n");
    if !config.active_lots.is_empty() {
        text.push_str("🟢 Active lots:\n");
        for lot in &config.active_lots {
            text.push_str(&format!("• {}\n", lot));
        }
    }
    if !config.inactive_lots.is_empty() {
        text.push_str("\n🔴 Inactive lots:\n");
        for lot in &config.inactive_lots {
            text.push_str(&format!("• {}\n", lot));
        }
    }
    if config.is_empty() {
        text.push_str("Lot list is empty");
    }

    Menu {
        text,
        rows: vec![vec![back_button()]],
    }
}

fn back_button() -> Button {
    Button::new("⬅️ Back", Callback::BackToMenu)
}

fn status_icon(status: LotStatus) -> &'static str {
    match status {
        LotStatus::Active => "🟢",
        LotStatus::Inactive => "🔴",
    }
}
