// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bulk activation and deactivation of lots on the marketplace.

use crate::account::LotAccount;
use tracing::{info, warn};

/// Per-lot outcome of a bulk activate/deactivate run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    /// Flag was flipped and saved.
    pub changed: Vec<String>,
    /// Flag was already at the target value.
    pub unchanged: Vec<String>,
    pub not_found: Vec<String>,
    pub errors: Vec<(String, String)>,
}

impl ActivationReport {
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(|(_, e)| e.as_str())
    }
}

/// Activate every lot in `lot_ids`, capturing failures per lot.
pub async fn activate_lots<A: LotAccount + ?Sized>(
    account: &A,
    lot_ids: &[String],
) -> ActivationReport {
    set_lots_active(account, lot_ids, true).await
}

/// Deactivate every lot in `lot_ids`, capturing failures per lot.
pub async fn deactivate_lots<A: LotAccount + ?Sized>(
    account: &A,
    lot_ids: &[String],
) -> ActivationReport {
    set_lots_active(account, lot_ids, false).await
}

async fn set_lots_active<A: LotAccount + ?Sized>(
    account: &A,
    lot_ids: &[String],
    active: bool,
) -> ActivationReport {
    let mut report = ActivationReport::default();

    for lot_id in lot_ids {
        match set_lot_active(account, lot_id, active).await {
            Ok(Outcome::Changed) => {
                info!("✅ Lot {} set active={}", lot_id, active);
                report.changed.push(lot_id.clone());
            }
            Ok(Outcome::Unchanged) => report.unchanged.push(lot_id.clone()),
            Ok(Outcome::NotFound) => {
                warn!("Lot {} not found on marketplace", lot_id);
                report.not_found.push(lot_id.clone());
            }
            Err(e) => {
                warn!("❌ Failed to set lot {} active={}: {}", lot_id, active, e);
                report.errors.push((lot_id.clone(), e));
            }
        }
    }

    report
}

enum Outcome {
    Changed,
    Unchanged,
    NotFound,
}

async fn set_lot_active<A: LotAccount + ?Sized>(
    account: &A,
    lot_id: &str,
    active: bool,
) -> Result<Outcome, String> {
    let id: u64 = lot_id
        .parse()
        .map_err(|e| format!("invalid lot id {:?}: {}", lot_id, e))?;

    let Some(mut fields) = account.get_lot_fields(id).await? else {
        return Ok(Outcome::NotFound);
    };
    if fields.active == active {
        return Ok(Outcome::Unchanged);
    }

    fields.active = active;
    account.save_lot(&fields).await?;
    Ok(Outcome::Changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::memory::MemoryAccount;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn activate_sorts_lots_into_buckets() {
        let account = MemoryAccount::new()
            .with_lot(1, false)
            .with_lot(2, true)
            .with_lot(3, false)
            .fail_save(3)
            .fail_fetch(4);

        let report = activate_lots(&account, &ids(&["1", "2", "3", "4", "5", "x"])).await;

        assert_eq!(report.changed, ids(&["1"]));
        assert_eq!(report.unchanged, ids(&["2"]));
        assert_eq!(report.not_found, ids(&["5"]));
        let failed: Vec<_> = report.errors.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(failed, vec!["3", "4", "x"]);
        assert_eq!(report.first_error(), Some("marketplace rejected the lot"));

        assert_eq!(account.is_active(1), Some(true));
        assert_eq!(account.is_active(3), Some(false));
    }

    #[tokio::test]
    async fn deactivate_only_saves_active_lots() {
        let account = MemoryAccount::new().with_lot(10, true).with_lot(11, false);

        let report = deactivate_lots(&account, &ids(&["10", "11"])).await;

        assert_eq!(report.changed, ids(&["10"]));
        assert_eq!(report.unchanged, ids(&["11"]));
        assert!(report.errors.is_empty());
        assert_eq!(account.saves(), vec![(10, false)]);
    }
}
