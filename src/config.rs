// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration module - loads settings from environment variables.

use std::path::PathBuf;

pub const NAME: &str = "DevLotFL";
pub const VERSION: &str = "0.0.1";
pub const DESCRIPTION: &str = "🎮 Lot management for FunPay\n\n\
    Features:\n\
    • Add/remove lots\n\
    • Activate/deactivate lots\n\
    • Control via Telegram";
pub const AUTHOR: &str = "@ssswwwi";
pub const UUID: &str = "f3accbd0-27fc-4bf7-9dc3-0e88c8e2c69f";

/// File name of the lot list inside the storage directory.
pub const LOTS_CONFIG_FILE: &str = "lots_config.json";

const DEFAULT_BASE_URL: &str = "https://funpay.com";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration for the lot bot.
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub telegram_token: String,
    pub admin_ids: Vec<u64>,

    // Marketplace
    pub golden_key: String,
    pub base_url: String,
    pub user_agent: String,

    // Storage
    pub storage_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        Ok(Self {
            // Telegram
            telegram_token: env_var("TELEGRAM_BOT_TOKEN")?,
            admin_ids: parse_admin_ids(&env_var_or("TELEGRAM_ADMIN_IDS", ""))?,

            // Marketplace
            golden_key: env_var("FUNPAY_GOLDEN_KEY")?,
            base_url: env_var_or("FUNPAY_BASE_URL", DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            user_agent: env_var_or("FUNPAY_USER_AGENT", DEFAULT_USER_AGENT),

            // Storage
            storage_dir: storage_dir_from_env(),
        })
    }

    /// Path of the JSON lot list.
    pub fn lots_file(&self) -> PathBuf {
        self.storage_dir.join(LOTS_CONFIG_FILE)
    }

    /// Whether a Telegram user may drive the menus. An empty list allows everyone.
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_ids.is_empty() || self.admin_ids.contains(&user_id)
    }
}

/// `LOTS_STORAGE_DIR`, falling back to [`default_storage_dir`].
pub fn storage_dir_from_env() -> PathBuf {
    std::env::var("LOTS_STORAGE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_storage_dir())
}

/// `storage/plugins/<UUID>`, relative to the working directory.
pub fn default_storage_dir() -> PathBuf {
    PathBuf::from("storage").join("plugins").join(UUID)
}

fn env_var(name: &str) -> Result<String, String> {
    std::env::var(name).map_err(|_| format!("{} not set", name))
}

fn env_var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_admin_ids(raw: &str) -> Result<Vec<u64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map_err(|e| format!("Invalid admin id {}: {}", s, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(admin_ids: Vec<u64>) -> Config {
        Config {
            telegram_token: "token".to_string(),
            admin_ids,
            golden_key: "key".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            storage_dir: default_storage_dir(),
        }
    }

    #[test]
    fn admin_ids_are_comma_separated() {
        assert_eq!(parse_admin_ids("1, 22 ,333").unwrap(), vec![1, 22, 333]);
        assert!(parse_admin_ids("").unwrap().is_empty());
        assert!(parse_admin_ids("12,abc").is_err());
    }

    #[test]
    fn empty_admin_list_allows_everyone() {
        assert!(config(vec![]).is_admin(42));
        assert!(config(vec![7]).is_admin(7));
        assert!(!config(vec![7]).is_admin(42));
    }

    #[test]
    fn lots_file_lives_under_plugin_storage() {
        let path = config(vec![]).lots_file();
        assert!(path.ends_with(format!("storage/plugins/{}/lots_config.json", UUID)));
    }
}
