use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhotoFeedError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`photo-feed config --set-api-key YOUR_KEY` または環境変数 FLICKR_API_KEY で設定してください")]
    MissingApiKey,

    /// リクエストは送信したが応答がない（一時的な障害、再試行可能）
    #[error("ネットワークエラー: {0}")]
    Network(String),

    /// 応答はあったがサービスの契約に反する
    #[error("APIエラー: {message}{}", .code.map(|c| format!(" (code {})", c)).unwrap_or_default())]
    Api { code: Option<i64>, message: String },

    #[error("入力値が不正: {0}")]
    Validation(String),

    #[error("プリロードタスクエラー: {0}")]
    Preload(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl PhotoFeedError {
    pub fn api(message: impl Into<String>) -> Self {
        PhotoFeedError::Api {
            code: None,
            message: message.into(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, PhotoFeedError::Network(_))
    }

    pub fn is_api(&self) -> bool {
        matches!(self, PhotoFeedError::Api { .. })
    }
}

impl From<photo_feed_common::Error> for PhotoFeedError {
    fn from(e: photo_feed_common::Error) -> Self {
        match e {
            photo_feed_common::Error::Validation(msg) => PhotoFeedError::Validation(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, PhotoFeedError>;
