// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! JSON-backed list of managed lots, split into active and inactive buckets.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk document: `{"active_lots": [...], "inactive_lots": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotsConfig {
    #[serde(default)]
    pub active_lots: Vec<String>,
    #[serde(default)]
    pub inactive_lots: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotStatus {
    Active,
    Inactive,
}

impl LotsConfig {
    pub fn status(&self, lot_id: &str) -> Option<LotStatus> {
        if self.active_lots.iter().any(|id| id == lot_id) {
            Some(LotStatus::Active)
        } else if self.inactive_lots.iter().any(|id| id == lot_id) {
            Some(LotStatus::Inactive)
        } else {
            None
        }
    }

    /// Every lot with its status, active ones first, in insertion order.
    pub fn all(&self) -> Vec<(String, LotStatus)> {
        self.active_lots
            .iter()
            .map(|id| (id.clone(), LotStatus::Active))
            .chain(
                self.inactive_lots
                    .iter()
                    .map(|id| (id.clone(), LotStatus::Inactive)),
            )
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.active_lots.is_empty() && self.inactive_lots.is_empty()
    }

    fn bucket_mut(&mut self, status: LotStatus) -> &mut Vec<String> {
        match status {
            LotStatus::Active => &mut self.active_lots,
            LotStatus::Inactive => &mut self.inactive_lots,
        }
    }
}

/// Lot list persisted to a single JSON file.
///
/// Every mutation re-reads the file, applies the change and writes it back, so
/// the file stays the source of truth even if it is edited by hand between
/// operations.
#[derive(Debug, Clone)]
pub struct LotStore {
    path: PathBuf,
}

impl LotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the lot lists. A missing file yields empty lists.
    pub fn load(&self) -> Result<LotsConfig, String> {
        if !self.path.exists() {
            debug!("No lots file at {}, starting fresh", self.path.display());
            return Ok(LotsConfig::default());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| format!("Failed to read {}: {}", self.path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse {}: {}", self.path.display(), e))
    }

    /// Save the lot lists, creating the storage directory if needed.
    pub fn save(&self, config: &LotsConfig) -> Result<(), String> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;
            }
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        config
            .serialize(&mut ser)
            .map_err(|e| format!("Failed to serialize lots: {}", e))?;

        fs::write(&self.path, buf)
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))?;

        debug!(
            "Saved {} active / {} inactive lots",
            config.active_lots.len(),
            config.inactive_lots.len()
        );
        Ok(())
    }

    /// Add a lot to the active or inactive bucket. Returns false if it is already listed.
    pub fn add(&self, lot_id: &str, active: bool) -> Result<bool, String> {
        let mut config = self.load()?;
        if config.status(lot_id).is_some() {
            return Ok(false);
        }

        let status = if active {
            LotStatus::Active
        } else {
            LotStatus::Inactive
        };
        config.bucket_mut(status).push(lot_id.to_string());
        self.save(&config)?;

        info!("➕ Added lot {} ({:?})", lot_id, status);
        Ok(true)
    }

    /// Remove a lot from whichever bucket holds it. Returns false if absent.
    pub fn remove(&self, lot_id: &str) -> Result<bool, String> {
        let mut config = self.load()?;
        let Some(status) = config.status(lot_id) else {
            return Ok(false);
        };

        config.bucket_mut(status).retain(|id| id != lot_id);
        self.save(&config)?;

        info!("➖ Removed lot {}", lot_id);
        Ok(true)
    }

    /// Move a lot to the other bucket. Returns false if absent.
    pub fn toggle(&self, lot_id: &str) -> Result<bool, String> {
        let mut config = self.load()?;
        let Some(status) = config.status(lot_id) else {
            return Ok(false);
        };

        let target = match status {
            LotStatus::Active => LotStatus::Inactive,
            LotStatus::Inactive => LotStatus::Active,
        };
        config.bucket_mut(status).retain(|id| id != lot_id);
        config.bucket_mut(target).push(lot_id.to_string());
        self.save(&config)?;

        info!("🔄 Lot {} is now {:?}", lot_id, target);
        Ok(true)
    }

    pub fn status(&self, lot_id: &str) -> Result<Option<LotStatus>, String> {
        Ok(self.load()?.status(lot_id))
    }
}
