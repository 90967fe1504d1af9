//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Resolve database, share-link, storage and webhook settings from
//!   `VALENTINE_*` environment variables.
//!
//! # Invariants
//! - Blank variables count as unset.
//! - Invalid numeric values fall back to defaults with a warning; loading
//!   configuration never fails.

use log::warn;
use std::path::PathBuf;
use std::time::Duration;

const DB_FILE_NAME: &str = "valentine.sqlite3";
const DEFAULT_ORIGIN: &str = "http://localhost:8080";
const DEFAULT_APP_PATH: &str = "yes-moments";
const DEFAULT_BUCKET: &str = "screenshots";
const DEFAULT_SETTLE_DELAY_MS: u64 = 2400;

/// Share link settings: `<origin>/<app_path>/#/v/<pageId>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinkConfig {
    pub origin: String,
    pub app_path: String,
}

impl Default for ShareLinkConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            app_path: DEFAULT_APP_PATH.to_string(),
        }
    }
}

/// Snapshot storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Http {
        base_url: String,
        bucket: String,
        api_key: Option<String>,
    },
    Dir {
        dir: PathBuf,
        public_base_url: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub share: ShareLinkConfig,
    pub webhook_url: Option<String>,
    pub storage: StorageConfig,
    /// Delay between the accept click and the snapshot capture.
    pub settle_delay: Duration,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = get("VALENTINE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME));

        let share = ShareLinkConfig {
            origin: get("VALENTINE_PUBLIC_ORIGIN")
                .map(|origin| origin.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_ORIGIN.to_string()),
            app_path: get("VALENTINE_APP_PATH")
                .map(|path| path.trim_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_APP_PATH.to_string()),
        };

        let webhook_url = get("VALENTINE_WEBHOOK_URL").or_else(|| get("N8N_WEBHOOK_URL"));

        let storage = match get("VALENTINE_STORAGE_URL") {
            Some(base_url) => StorageConfig::Http {
                base_url,
                bucket: get("VALENTINE_STORAGE_BUCKET")
                    .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
                api_key: get("VALENTINE_STORAGE_KEY"),
            },
            None => StorageConfig::Dir {
                dir: get("VALENTINE_SNAPSHOT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_BUCKET)),
                public_base_url: get("VALENTINE_SNAPSHOT_PUBLIC_URL"),
            },
        };

        let settle_delay_ms = match get("VALENTINE_SETTLE_DELAY_MS") {
            Some(raw) => raw.parse::<u64>().unwrap_or_else(|err| {
                warn!(
                    "event=config_load module=config status=fallback key=VALENTINE_SETTLE_DELAY_MS error={err}"
                );
                DEFAULT_SETTLE_DELAY_MS
            }),
            None => DEFAULT_SETTLE_DELAY_MS,
        };

        Self {
            db_path,
            share,
            webhook_url,
            storage,
            settle_delay: Duration::from_millis(settle_delay_ms),
            log_level: get("VALENTINE_LOG_LEVEL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, StorageConfig};
    use std::collections::HashMap;
    use std::time::Duration;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.share.app_path, "yes-moments");
        assert_eq!(config.settle_delay, Duration::from_millis(2400));
        assert_eq!(config.webhook_url, None);
        assert!(matches!(config.storage, StorageConfig::Dir { .. }));
    }

    #[test]
    fn webhook_alias_and_storage_url_are_honored() {
        let config = config_from(&[
            ("N8N_WEBHOOK_URL", "https://hooks.example/yes"),
            ("VALENTINE_STORAGE_URL", "https://store.example"),
            ("VALENTINE_PUBLIC_ORIGIN", "https://love.example/"),
        ]);
        assert_eq!(config.webhook_url.as_deref(), Some("https://hooks.example/yes"));
        assert_eq!(config.share.origin, "https://love.example");
        match config.storage {
            StorageConfig::Http { bucket, .. } => assert_eq!(bucket, "screenshots"),
            other => panic!("unexpected storage: {other:?}"),
        }
    }

    #[test]
    fn blank_and_invalid_values_fall_back() {
        let config = config_from(&[
            ("VALENTINE_DB_PATH", "   "),
            ("VALENTINE_SETTLE_DELAY_MS", "soon"),
        ]);
        assert!(config.db_path.ends_with("valentine.sqlite3"));
        assert_eq!(config.settle_delay, Duration::from_millis(2400));
    }
}
