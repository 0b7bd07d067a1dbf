use crate::error::{PhotoFeedError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const API_KEY_ENV: &str = "FLICKR_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_url: String,
    pub timeout_seconds: u64,
    /// テキスト検索に必ず付ける検索語
    pub default_search_text: String,
    pub per_page: u32,
    /// 1チャンクでプリロードする画像数
    pub preload_chunk_size: usize,
    /// 最初のチャンクを待つ上限
    pub first_chunk_timeout_ms: u64,
    /// 位置検索の半径（km）
    pub search_radius: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://api.flickr.com/services/rest".into(),
            timeout_seconds: 10,
            default_search_text: "dog".into(),
            per_page: 100,
            preload_chunk_size: 6,
            first_chunk_timeout_ms: 5000,
            search_radius: 5,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PhotoFeedError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("photo-feed").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(PhotoFeedError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn first_chunk_timeout(&self) -> Duration {
        Duration::from_millis(self.first_chunk_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.per_page, 100);
        assert_eq!(config.preload_chunk_size, 6);
        assert_eq!(config.first_chunk_timeout(), Duration::from_secs(5));
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"per_page": 50}"#).unwrap();
        assert_eq!(config.per_page, 50);
        assert_eq!(config.default_search_text, "dog");
    }
}
