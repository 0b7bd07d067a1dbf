//! チャンク単位の画像プリロード
//!
//! 写真を最大 `chunk_size` 枚ずつのチャンクに分け、全チャンクを並行して読み込む。
//! チャンク内の全画像が確定（成功または失敗）した時点でそのチャンクを送信し、
//! 全チャンクの送信が終わってから全体の結果を返す。
//!
//! スレッドは使わず、同一タスク内の協調的な並行処理で進める。

mod loader;

pub use loader::{HttpImageLoader, ImageLoader};

use futures::future::join_all;
use photo_feed_common::PhotoRecord;
use tokio::sync::mpsc::UnboundedSender;

/// チャンク単位でプリロードする
///
/// # Arguments
/// * `loader` - 画像ローダー
/// * `records` - 対象の写真（順序を保ってチャンクに分割）
/// * `chunk_size` - 1チャンクの最大枚数（0 は 1 として扱う）
/// * `chunk_tx` - 準備できたチャンクの送信先（受信側が閉じていても続行）
///
/// # Returns
/// 全チャンク（分割順）。全チャンクの送信後に返る
pub async fn preload_in_chunks<L>(
    loader: &L,
    records: Vec<PhotoRecord>,
    chunk_size: usize,
    chunk_tx: &UnboundedSender<Vec<PhotoRecord>>,
) -> Vec<Vec<PhotoRecord>>
where
    L: ImageLoader + ?Sized,
{
    let chunk_size = if chunk_size == 0 {
        tracing::warn!("チャンクサイズ0は1として扱います");
        1
    } else {
        chunk_size
    };

    let chunks = split_to_chunks(records, chunk_size);
    let total = chunks.len();

    let pending = chunks.into_iter().enumerate().map(move |(index, chunk)| async move {
        join_all(chunk.iter().map(|record| settle(loader, record))).await;

        tracing::debug!(chunk = index + 1, total, size = chunk.len(), "チャンクのプリロード完了");
        let _ = chunk_tx.send(chunk.clone());
        chunk
    });

    join_all(pending).await
}

/// 配列を最大 `length` 件ずつに分割（順序を維持）
pub fn split_to_chunks<T: Clone>(items: Vec<T>, length: usize) -> Vec<Vec<T>> {
    items.chunks(length.max(1)).map(<[T]>::to_vec).collect()
}

// 失敗は吸収する。画像が1枚欠けてもフィードを止めない
async fn settle<L>(loader: &L, record: &PhotoRecord)
where
    L: ImageLoader + ?Sized,
{
    if let Err(e) = loader.load(&record.image_url).await {
        tracing::debug!(id = %record.id, error = %e, "画像のプリロードに失敗（無視）");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_to_chunks() {
        let chunks = split_to_chunks((1..=13).collect(), 6);
        let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![6, 6, 1]);
        assert_eq!(chunks[2], vec![13]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_to_chunks(Vec::<u8>::new(), 6).is_empty());
    }

    #[test]
    fn test_split_zero_length_is_one() {
        assert_eq!(split_to_chunks(vec![1, 2], 0), vec![vec![1], vec![2]]);
    }
}
