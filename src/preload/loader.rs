//! 画像ローダー

use crate::error::{PhotoFeedError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// 画像1枚を読み込む
///
/// 成功・失敗のどちらでも「確定」とみなされる。失敗はスケジューラ側で吸収する。
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<()>;
}

/// HTTP で画像を取得し、画像として認識できるかを確認するローダー
pub struct HttpImageLoader {
    http: Client,
}

impl HttpImageLoader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PhotoFeedError::Config(format!("HTTPクライアント作成エラー: {}", e)))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(PhotoFeedError::Validation("画像URLが空です".into()));
        }

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PhotoFeedError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PhotoFeedError::api(format!(
                "画像の取得に失敗: {} ({})",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PhotoFeedError::Network(e.to_string()))?;

        image::guess_format(&bytes)
            .map(|_| ())
            .map_err(|e| PhotoFeedError::api(format!("画像として認識できません: {} ({})", url, e)))
    }
}
