use crate::error::PhotoFeedError;

/// 通信障害時に利用者へ出す案内
pub const NETWORK_NOTICE: &str = "Sorry but we are unable to fetch photos. Please try again later.";

/// 取得サイクルの失敗を受け取る外部の協調先
///
/// - `network_unavailable`: 一時的な通信障害。閉じられる軽い通知向け
/// - `fatal`: API エラーや分類外のエラー。全体のエラーハンドラ向け
pub trait FeedObserver: Send + Sync {
    fn network_unavailable(&self, notice: &str, error: &PhotoFeedError);

    fn fatal(&self, error: &PhotoFeedError);
}

/// tracing に出力するだけのデフォルト実装
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl FeedObserver for LogObserver {
    fn network_unavailable(&self, notice: &str, error: &PhotoFeedError) {
        tracing::warn!(error = %error, "{}", notice);
    }

    fn fatal(&self, error: &PhotoFeedError) {
        tracing::error!(error = %error, "写真フィードの取得に失敗しました");
    }
}
