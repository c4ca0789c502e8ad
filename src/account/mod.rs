// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Marketplace account access: fetch and save lot edit forms.

mod funpay;
#[cfg(test)]
pub mod memory;

pub use funpay::FunPayAccount;

use async_trait::async_trait;
use std::collections::BTreeMap;

/// Editable state of a single lot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotFields {
    pub lot_id: u64,
    pub active: bool,
    /// Remaining form values, posted back unchanged on save.
    pub fields: BTreeMap<String, String>,
}

impl LotFields {
    pub fn new(lot_id: u64, active: bool) -> Self {
        Self {
            lot_id,
            active,
            fields: BTreeMap::new(),
        }
    }
}

/// Account client used to read and persist lot state on the marketplace.
#[async_trait]
pub trait LotAccount: Send + Sync {
    /// Fetch a lot's editable fields. `Ok(None)` when the lot does not exist
    /// or does not belong to this account.
    async fn get_lot_fields(&self, lot_id: u64) -> Result<Option<LotFields>, String>;

    /// Persist a lot's fields, including its active flag.
    async fn save_lot(&self, fields: &LotFields) -> Result<(), String>;
}
