// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Lot list storage and remote status changes.

pub mod remote;
pub mod store;

pub use remote::{activate_lots, deactivate_lots};
pub use store::{LotStatus, LotStore, LotsConfig};
