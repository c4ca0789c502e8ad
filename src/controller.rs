// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Menu state machine: turns button presses and typed lot ids into store
//! mutations, remote status changes and replies.

use crate::account::LotAccount;
use crate::lots::{activate_lots, deactivate_lots, LotStatus, LotStore};
use crate::menu::{self, Callback, Menu, PickerKind};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// What to do with the message that carried the pressed button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Replace the message text and keyboard.
    Edit(Menu),
    /// Send a new prompt and wait for the operator to type a lot id.
    Prompt(Menu),
    /// Delete the message and leave input mode.
    Dismiss,
    None,
}

/// Reply to a button press: an optional toast plus a menu action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackReply {
    pub notice: Option<String>,
    pub action: MenuAction,
}

impl CallbackReply {
    fn edit(menu: Menu) -> Self {
        Self {
            notice: None,
            action: MenuAction::Edit(menu),
        }
    }

    fn notice(text: impl Into<String>) -> Self {
        Self {
            notice: Some(text.into()),
            action: MenuAction::None,
        }
    }

    fn with_menu(mut self, menu: Menu) -> Self {
        self.action = MenuAction::Edit(menu);
        self
    }
}

pub struct LotController<A: LotAccount + ?Sized> {
    store: Mutex<LotStore>,
    account: Arc<A>,
}

impl<A: LotAccount + ?Sized> LotController<A> {
    pub fn new(store: LotStore, account: Arc<A>) -> Self {
        Self {
            store: Mutex::new(store),
            account,
        }
    }

    pub async fn handle_callback(&self, callback: &Callback) -> CallbackReply {
        let result = match callback {
            Callback::AddLot => Ok(CallbackReply {
                notice: None,
                action: MenuAction::Prompt(menu::add_prompt()),
            }),
            Callback::RemoveMenu => self.picker(PickerKind::Remove).await,
            Callback::ToggleMenu => self.picker(PickerKind::Toggle).await,
            Callback::RemoveLot(id) => self.remove_lot(id).await,
            Callback::ToggleLot(id) => self.toggle_lot(id).await,
            Callback::ViewLots => self.view_lots().await,
            Callback::BackToMenu => Ok(CallbackReply::edit(menu::main_menu())),
            Callback::Cancel => Ok(CallbackReply {
                notice: None,
                action: MenuAction::Dismiss,
            }),
        };

        result.unwrap_or_else(|e| {
            error!("❌ Callback {:?} failed: {}", callback, e);
            CallbackReply::notice(format!("Error: {}", e))
        })
    }

    async fn picker(&self, kind: PickerKind) -> Result<CallbackReply, String> {
        let config = self.store.lock().await.load()?;
        if config.is_empty() {
            return Ok(CallbackReply::notice("Lot list is empty!"));
        }
        Ok(CallbackReply::edit(menu::lot_picker(&config, kind)))
    }

    async fn view_lots(&self) -> Result<CallbackReply, String> {
        let config = self.store.lock().await.load()?;
        Ok(CallbackReply::edit(menu::lot_list(&config)))
    }

    async fn remove_lot(&self, lot_id: &str) -> Result<CallbackReply, String> {
        let removed = self.store.lock().await.remove(lot_id)?;
        let notice = if removed {
            format!("Lot {} removed!", lot_id)
        } else {
            "Failed to remove lot!".to_string()
        };
        Ok(CallbackReply::notice(notice).with_menu(menu::main_menu()))
    }

    async fn toggle_lot(&self, lot_id: &str) -> Result<CallbackReply, String> {
        let store = self.store.lock().await;
        let Some(status) = store.status(lot_id)? else {
            return Ok(CallbackReply::notice(format!("Lot {} is not in the list", lot_id))
                .with_menu(menu::main_menu()));
        };

        let ids = [lot_id.to_string()];
        let (report, done) = match status {
            LotStatus::Active => (deactivate_lots(&*self.account, &ids).await, "deactivated"),
            LotStatus::Inactive => (activate_lots(&*self.account, &ids).await, "activated"),
        };

        if let Some(e) = report.first_error() {
            return Ok(CallbackReply::notice(format!("Error: {}", e)));
        }
        if !report.not_found.is_empty() {
            return Ok(CallbackReply::notice(format!(
                "Lot {} not found on the marketplace",
                lot_id
            )));
        }

        // Changed remotely, or the marketplace already had the target state.
        store.toggle(lot_id)?;
        info!("🔄 Lot {} {}", lot_id, done);
        Ok(
            CallbackReply::notice(format!("Lot {} {} successfully!", lot_id, done))
                .with_menu(menu::main_menu()),
        )
    }

    /// Handle a lot id typed while in input mode and return the reply text.
    pub async fn handle_lot_input(&self, text: &str) -> String {
        let Some(id) = parse_lot_id(text) else {
            return "❌ Lot ID must be a number".to_string();
        };

        match self.add_lot(id).await {
            Ok(text) => text,
            Err(e) => {
                error!("❌ Failed to add lot {}: {}", id, e);
                format!("❌ Error while adding lot: {}", e)
            }
        }
    }

    async fn add_lot(&self, id: u64) -> Result<String, String> {
        if self.account.get_lot_fields(id).await?.is_none() {
            return Ok("❌ No lot with this ID was found on FunPay".to_string());
        }

        // Stored in canonical form so "7" and "007" are the same lot.
        let lot_id = id.to_string();
        let store = self.store.lock().await;
        if !store.add(&lot_id, true)? {
            return Ok(format!("❌ Lot {} is already in the list", lot_id));
        }

        let report = activate_lots(&*self.account, &[lot_id.clone()]).await;
        let text = if !report.changed.is_empty() {
            format!("✅ Lot {} added and activated", lot_id)
        } else if !report.unchanged.is_empty() {
            format!("✅ Lot {} added (it was already active)", lot_id)
        } else {
            format!("⚠️ Lot {} added, but activation failed", lot_id)
        };
        Ok(text)
    }
}

/// Positive decimal lot id; surrounding whitespace is ignored.
fn parse_lot_id(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<u64>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::memory::MemoryAccount;
    use tempfile::TempDir;

    fn controller(
        dir: &TempDir,
        account: MemoryAccount,
    ) -> (LotController<MemoryAccount>, Arc<MemoryAccount>) {
        let account = Arc::new(account);
        let store = LotStore::new(dir.path().join("lots_config.json"));
        (LotController::new(store, Arc::clone(&account)), account)
    }

    fn store(dir: &TempDir) -> LotStore {
        LotStore::new(dir.path().join("lots_config.json"))
    }

    #[tokio::test]
    async fn add_prompt_and_cancel() {
        let dir = TempDir::new().unwrap();
        let (c, _) = controller(&dir, MemoryAccount::new());

        let reply = c.handle_callback(&Callback::AddLot).await;
        assert_eq!(reply.action, MenuAction::Prompt(menu::add_prompt()));

        let reply = c.handle_callback(&Callback::Cancel).await;
        assert_eq!(reply.action, MenuAction::Dismiss);
    }

    #[tokio::test]
    async fn pickers_refuse_empty_list() {
        let dir = TempDir::new().unwrap();
        let (c, _) = controller(&dir, MemoryAccount::new());

        for cb in [Callback::RemoveMenu, Callback::ToggleMenu] {
            let reply = c.handle_callback(&cb).await;
            assert_eq!(reply.notice.as_deref(), Some("Lot list is empty!"));
            assert_eq!(reply.action, MenuAction::None);
        }

        let reply = c.handle_callback(&Callback::ViewLots).await;
        match reply.action {
            MenuAction::Edit(menu) => assert!(menu.text.ends_with("Lot list is empty")),
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[tokio::test]
    async fn typed_id_is_added_and_activated() {
        let dir = TempDir::new().unwrap();
        let (c, account) = controller(&dir, MemoryAccount::new().with_lot(500, false));

        let reply = c.handle_lot_input(" 500 ").await;
        assert_eq!(reply, "✅ Lot 500 added and activated");
        assert_eq!(account.is_active(500), Some(true));
        assert_eq!(store(&dir).load().unwrap().active_lots, vec!["500"]);

        let reply = c.handle_lot_input("500").await;
        assert_eq!(reply, "❌ Lot 500 is already in the list");
    }

    #[tokio::test]
    async fn leading_zeros_name_the_same_lot() {
        let dir = TempDir::new().unwrap();
        let (c, _) = controller(&dir, MemoryAccount::new().with_lot(7, true));

        assert_eq!(
            c.handle_lot_input("7").await,
            "✅ Lot 7 added (it was already active)"
        );
        assert_eq!(
            c.handle_lot_input("007").await,
            "❌ Lot 7 is already in the list"
        );
        assert_eq!(store(&dir).load().unwrap().active_lots, vec!["7"]);
    }

    #[tokio::test]
    async fn zero_padded_first_entry_is_stored_canonically() {
        let dir = TempDir::new().unwrap();
        let (c, _) = controller(&dir, MemoryAccount::new().with_lot(42, false));

        assert_eq!(
            c.handle_lot_input("0042").await,
            "✅ Lot 42 added and activated"
        );
        assert_eq!(store(&dir).load().unwrap().active_lots, vec!["42"]);
    }

    #[test]
    fn lot_ids_must_be_positive_decimals() {
        assert_eq!(parse_lot_id(" 15\n"), Some(15));
        assert_eq!(parse_lot_id("007"), Some(7));
        for bad in ["", "abc", "0", "000", "-4", "+4", "1.5", "1 2"] {
            assert_eq!(parse_lot_id(bad), None, "{:?}", bad);
        }
    }

    #[tokio::test]
    async fn typed_id_outcomes() {
        let dir = TempDir::new().unwrap();
        let account = MemoryAccount::new()
            .with_lot(1, true)
            .with_lot(2, false)
            .fail_save(2)
            .fail_fetch(3);
        let (c, _) = controller(&dir, account);

        assert_eq!(c.handle_lot_input("abc").await, "❌ Lot ID must be a number");
        assert_eq!(c.handle_lot_input("0").await, "❌ Lot ID must be a number");

        assert_eq!(
            c.handle_lot_input("1").await,
            "✅ Lot 1 added (it was already active)"
        );
        assert_eq!(
            c.handle_lot_input("2").await,
            "⚠️ Lot 2 added, but activation failed"
        );
        assert_eq!(
            c.handle_lot_input("9").await,
            "❌ No lot with this ID was found on FunPay"
        );
        let reply = c.handle_lot_input("3").await;
        assert!(reply.starts_with("❌ Error while adding lot: "));

        assert_eq!(store(&dir).load().unwrap().active_lots, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn toggle_flips_remote_then_local() {
        let dir = TempDir::new().unwrap();
        let (c, account) = controller(&dir, MemoryAccount::new().with_lot(7, true));
        store(&dir).add("7", true).unwrap();

        let reply = c.handle_callback(&Callback::ToggleLot("7".into())).await;
        assert_eq!(reply.notice.as_deref(), Some("Lot 7 deactivated successfully!"));
        assert_eq!(reply.action, MenuAction::Edit(menu::main_menu()));
        assert_eq!(account.is_active(7), Some(false));
        assert_eq!(store(&dir).status("7").unwrap(), Some(LotStatus::Inactive));

        let reply = c.handle_callback(&Callback::ToggleLot("7".into())).await;
        assert_eq!(reply.notice.as_deref(), Some("Lot 7 activated successfully!"));
        assert_eq!(account.is_active(7), Some(true));
        assert_eq!(store(&dir).status("7").unwrap(), Some(LotStatus::Active));
    }

    #[tokio::test]
    async fn toggle_resyncs_when_remote_already_matches() {
        let dir = TempDir::new().unwrap();
        let (c, account) = controller(&dir, MemoryAccount::new().with_lot(8, true));
        store(&dir).add("8", false).unwrap();

        let reply = c.handle_callback(&Callback::ToggleLot("8".into())).await;
        assert_eq!(reply.notice.as_deref(), Some("Lot 8 activated successfully!"));
        assert!(account.saves().is_empty());
        assert_eq!(store(&dir).status("8").unwrap(), Some(LotStatus::Active));
    }

    #[tokio::test]
    async fn toggle_failure_keeps_local_state() {
        let dir = TempDir::new().unwrap();
        let account = MemoryAccount::new().with_lot(5, false).fail_save(5);
        let (c, _) = controller(&dir, account);
        store(&dir).add("5", false).unwrap();
        store(&dir).add("6", true).unwrap();

        let reply = c.handle_callback(&Callback::ToggleLot("5".into())).await;
        assert_eq!(reply.notice.as_deref(), Some("Error: marketplace rejected the lot"));
        assert_eq!(reply.action, MenuAction::None);
        assert_eq!(store(&dir).status("5").unwrap(), Some(LotStatus::Inactive));

        let reply = c.handle_callback(&Callback::ToggleLot("6".into())).await;
        assert_eq!(
            reply.notice.as_deref(),
            Some("Lot 6 not found on the marketplace")
        );
        assert_eq!(store(&dir).status("6").unwrap(), Some(LotStatus::Active));

        let reply = c.handle_callback(&Callback::ToggleLot("404".into())).await;
        assert_eq!(reply.notice.as_deref(), Some("Lot 404 is not in the list"));
    }

    #[tokio::test]
    async fn remove_from_picker() {
        let dir = TempDir::new().unwrap();
        let (c, _) = controller(&dir, MemoryAccount::new());
        store(&dir).add("3", true).unwrap();

        let reply = c.handle_callback(&Callback::RemoveMenu).await;
        match &reply.action {
            MenuAction::Edit(menu) => {
                assert_eq!(menu.rows[0][0].callback, Callback::RemoveLot("3".into()))
            }
            other => panic!("unexpected action {:?}", other),
        }

        let reply = c.handle_callback(&Callback::RemoveLot("3".into())).await;
        assert_eq!(reply.notice.as_deref(), Some("Lot 3 removed!"));
        assert_eq!(reply.action, MenuAction::Edit(menu::main_menu()));

        let reply = c.handle_callback(&Callback::RemoveLot("3".into())).await;
        assert_eq!(reply.notice.as_deref(), Some("Failed to remove lot!"));
    }
}
