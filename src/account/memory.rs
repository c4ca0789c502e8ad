// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory account used by tests.

use super::{LotAccount, LotFields};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryAccount {
    lots: Mutex<HashMap<u64, bool>>,
    failing_fetch: Mutex<HashSet<u64>>,
    failing_save: Mutex<HashSet<u64>>,
    saves: Mutex<Vec<(u64, bool)>>,
}

impl MemoryAccount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lot(self, lot_id: u64, active: bool) -> Self {
        self.lots.lock().unwrap().insert(lot_id, active);
        self
    }

    pub fn fail_fetch(self, lot_id: u64) -> Self {
        self.failing_fetch.lock().unwrap().insert(lot_id);
        self
    }

    pub fn fail_save(self, lot_id: u64) -> Self {
        self.failing_save.lock().unwrap().insert(lot_id);
        self
    }

    pub fn is_active(&self, lot_id: u64) -> Option<bool> {
        self.lots.lock().unwrap().get(&lot_id).copied()
    }

    pub fn saves(&self) -> Vec<(u64, bool)> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl LotAccount for MemoryAccount {
    async fn get_lot_fields(&self, lot_id: u64) -> Result<Option<LotFields>, String> {
        if self.failing_fetch.lock().unwrap().contains(&lot_id) {
            return Err(format!("connection reset while fetching {}", lot_id));
        }
        Ok(self
            .lots
            .lock()
            .unwrap()
            .get(&lot_id)
            .map(|active| LotFields::new(lot_id, *active)))
    }

    async fn save_lot(&self, fields: &LotFields) -> Result<(), String> {
        if self.failing_save.lock().unwrap().contains(&fields.lot_id) {
            return Err("marketplace rejected the lot".to_string());
        }
        self.saves.lock().unwrap().push((fields.lot_id, fields.active));
        self.lots.lock().unwrap().insert(fields.lot_id, fields.active);
        Ok(())
    }
}
