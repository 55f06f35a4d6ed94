use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::CACHE_TTL_MS;
use crate::error::{CardwiseError, Result};
use crate::filters::FilterPolicy;

const DB_FILE: &str = "cardwise.db";
const FEED_FILE: &str = "cards.xml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_dir_string")]
    pub data_dir: String,
    /// HTTP(S) URL or local path of the XML card feed. Empty means
    /// `cards.xml` inside the data directory.
    #[serde(default)]
    pub feed_url: String,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,
    /// Reject unknown filter tags instead of ignoring them.
    #[serde(default)]
    pub strict_filters: bool,
}

fn default_data_dir_string() -> String {
    default_data_dir().to_string_lossy().to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    8
}

fn default_cache_ttl_hours() -> u64 {
    (CACHE_TTL_MS / (60 * 60 * 1000)) as u64
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_string(),
            feed_url: String::new(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            cache_ttl_hours: default_cache_ttl_hours(),
            strict_filters: false,
        }
    }
}

impl Settings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn cache_ttl_ms(&self) -> i64 {
        (self.cache_ttl_hours as i64).saturating_mul(60 * 60 * 1000)
    }

    pub fn filter_policy(&self) -> FilterPolicy {
        if self.strict_filters {
            FilterPolicy::Strict
        } else {
            FilterPolicy::Permissive
        }
    }

    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(DB_FILE)
    }

    pub fn feed_location(&self) -> String {
        if self.feed_url.trim().is_empty() {
            PathBuf::from(&self.data_dir)
                .join(FEED_FILE)
                .to_string_lossy()
                .to_string()
        } else {
            self.feed_url.trim().to_string()
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("cardwise")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local")
        .join("share")
        .join("cardwise")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| CardwiseError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

/// Expand a leading `~` and make existing paths absolute.
pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/test".to_string(),
            feed_url: "/tmp/cards.xml".to_string(),
            fetch_timeout_secs: 3,
            cache_ttl_hours: 1,
            strict_filters: true,
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.data_dir, "/tmp/test");
        assert_eq!(loaded.feed_url, "/tmp/cards.xml");
        assert_eq!(loaded.fetch_timeout(), Duration::from_secs(3));
        assert_eq!(loaded.cache_ttl_ms(), 3_600_000);
        assert_eq!(loaded.filter_policy(), FilterPolicy::Strict);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.feed_url.is_empty());
        assert!(s.feed_location().ends_with("cards.xml"));
        assert_eq!(s.fetch_timeout_secs, 8);
        assert_eq!(s.cache_ttl_ms(), CACHE_TTL_MS);
        assert_eq!(s.filter_policy(), FilterPolicy::Permissive);
        assert!(s.db_path().ends_with("cardwise.db"));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.data_dir, "/tmp/test");
        assert_eq!(s.fetch_timeout_secs, 8);
        assert_eq!(s.cache_ttl_hours, 24);
        assert!(!s.strict_filters);
    }

    #[test]
    fn test_db_path_under_data_dir() {
        let s = Settings {
            data_dir: "/srv/cardwise".to_string(),
            ..Default::default()
        };
        assert_eq!(s.db_path(), PathBuf::from("/srv/cardwise/cardwise.db"));
        assert_eq!(s.feed_location(), "/srv/cardwise/cards.xml");
        let s = Settings {
            feed_url: " https://example.com/cards.xml ".to_string(),
            ..s
        };
        assert_eq!(s.feed_location(), "https://example.com/cards.xml");
    }
}
