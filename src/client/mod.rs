//! 検索クライアント
//!
//! 通信失敗は `Network`、応答が契約に反する場合は `Api` に分類して返す。
//! 生の通信エラーをそのまま返すことはない。

mod flickr;

pub use flickr::{SearchClient, DEFAULT_EXTRAS, SEARCH_METHOD};

use crate::error::Result;
use async_trait::async_trait;
use photo_feed_common::{ParameterSet, SearchPayload};

/// 写真検索の抽象
///
/// 検証済みの応答から取り出した `photos` 部分を返す。応答に含まれない場合は `None`。
#[async_trait]
pub trait PhotoSearch: Send + Sync {
    async fn search(&self, params: &ParameterSet) -> Result<Option<SearchPayload>>;
}
