//! Flickr REST API クライアント

use super::PhotoSearch;
use crate::config::Config;
use crate::error::{PhotoFeedError, Result};
use async_trait::async_trait;
use photo_feed_common::{ParameterSet, SearchPayload};
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// 検索メソッド名
pub const SEARCH_METHOD: &str = "flickr.photos.search";

/// 正規化に必要な追加フィールド
pub const DEFAULT_EXTRAS: &str = "description,owner_name,url_m,url_o,url_sq,date_upload,geo";

const EXPECTED_CONTENT_TYPE: &str = "application/json";

/// `stat` 検証後の応答本体
#[derive(Debug, Deserialize)]
struct SearchResponse {
    photos: Option<SearchPayload>,
}

/// Flickr API クライアント
pub struct SearchClient {
    http: Client,
    api_url: String,
    api_key: String,
    default_text: String,
}

impl SearchClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        default_text: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PhotoFeedError::Config(format!("HTTPクライアント作成エラー: {}", e)))?;

        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            default_text: default_text.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.api_url,
            config.get_api_key()?,
            &config.default_search_text,
            config.timeout(),
        )
    }

    /// 検索して `photos` 部分を返す
    ///
    /// メソッド名・extras・デフォルト検索語を下敷きにし、呼び出し側のパラメータで上書きする。
    pub async fn search_photos(&self, params: &ParameterSet) -> Result<Option<SearchPayload>> {
        let mut query = ParameterSet::new();
        query.insert_raw("method", SEARCH_METHOD);
        query.insert_raw("extras", DEFAULT_EXTRAS);
        query.insert("text", &self.default_text);
        query.merge(params.clone());

        let body = self.request(query).await?;
        let response: SearchResponse = serde_json::from_value(body)
            .map_err(|e| PhotoFeedError::api(format!("検索結果の形式が不正です: {}", e)))?;

        Ok(response.photos)
    }

    /// 共通パラメータと API キーを付けて送信し、検証済みの本体を返す
    async fn request(&self, params: ParameterSet) -> Result<Value> {
        let mut query = params;
        query.insert_raw("format", "json");
        query.insert_raw("nojsoncallback", "1");
        query.insert("api_key", &self.api_key);

        tracing::debug!(
            method = query.get("method").unwrap_or_default(),
            page = query.get("page").unwrap_or_default(),
            "Flickr APIへリクエスト"
        );

        // 値はエンコード済み。RequestBuilder::query は二重にエンコードするため使わない
        let url = format!("{}/?{}", self.api_url, query.to_query_string());

        let response = self.http.get(&url).send().await.map_err(|e| {
            tracing::warn!(error = %e, "Flickr APIから応答がありません");
            PhotoFeedError::Network(format!("写真を取得できませんでした: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PhotoFeedError::api(format!(
                "HTTPステータスが成功ではありません: {}",
                status
            )));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_json_content_type(&content_type) {
            return Err(PhotoFeedError::api(format!(
                "応答が {} 形式ではありません: \"{}\"",
                EXPECTED_CONTENT_TYPE, content_type
            )));
        }

        // 本文の受信中に切断された場合も応答なしとして扱う
        let bytes = response.bytes().await.map_err(|e| {
            PhotoFeedError::Network(format!("応答本文の受信に失敗しました: {}", e))
        })?;

        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| PhotoFeedError::api(format!("応答のJSON解析に失敗しました: {}", e)))?;

        check_stat(&body)?;
        Ok(body)
    }
}

#[async_trait]
impl PhotoSearch for SearchClient {
    async fn search(&self, params: &ParameterSet) -> Result<Option<SearchPayload>> {
        self.search_photos(params).await
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case(EXPECTED_CONTENT_TYPE))
        .unwrap_or(false)
}

fn check_stat(body: &Value) -> Result<()> {
    if body.get("stat").and_then(Value::as_str) == Some("ok") {
        return Ok(());
    }

    let code = body.get("code").and_then(|c| {
        c.as_i64()
            .or_else(|| c.as_str().and_then(|s| s.parse().ok()))
    });
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("statが\"ok\"ではありません")
        .to_string();

    Err(PhotoFeedError::Api { code, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_content_type() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("Application/JSON"));
        assert!(!is_json_content_type("text/html"));
        assert!(!is_json_content_type(""));
    }

    #[test]
    fn test_check_stat_ok() {
        assert!(check_stat(&json!({"stat": "ok", "photos": {}})).is_ok());
    }

    #[test]
    fn test_check_stat_fail_carries_code() {
        let err = check_stat(&json!({"stat": "fail", "code": 100, "message": "Invalid API Key"}))
            .unwrap_err();
        match err {
            PhotoFeedError::Api { code, message } => {
                assert_eq!(code, Some(100));
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_check_stat_missing() {
        let err = check_stat(&json!({"photos": {}})).unwrap_err();
        assert!(err.is_api());
    }
}
