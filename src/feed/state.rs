//! フィード状態
//!
//! フィンガープリントごとの結果バケットと、読み込み・ページングのフラグを持つ。
//! 更新は `FeedOrchestrator` からのみ行い、外部には `FeedSnapshot` のコピーを渡す。

use crate::error::{PhotoFeedError, Result};
use photo_feed_common::{Fingerprint, PhotoRecord};
use serde::Serialize;
use std::collections::HashMap;

/// Flickr が受け付ける1ページの最大件数
pub const MAX_PER_PAGE: u32 = 500;

/// 取得サイクルの識別子
///
/// `epoch` はリセットごと、`cycle` は取得開始ごとに進む。
/// 古いサイクルからの更新は新しいサイクルの状態を変更しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTicket {
    epoch: u64,
    cycle: u64,
}

/// UI 向けの状態コピー
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub current_fingerprint: Option<Fingerprint>,
    pub page: u32,
    pub per_page: u32,
    pub loading: bool,
    pub preloading: bool,
    pub preloading_first_chunk: bool,
    pub more_photos: bool,
    /// 現在のフィンガープリントのバケット
    pub photos: Vec<PhotoRecord>,
}

#[derive(Debug, Clone)]
pub struct FeedState {
    buckets: HashMap<Fingerprint, Vec<PhotoRecord>>,
    current_fingerprint: Option<Fingerprint>,
    page: u32,
    per_page: u32,
    default_per_page: u32,
    loading: bool,
    preloading: bool,
    preloading_first_chunk: bool,
    more_photos: bool,
    epoch: u64,
    cycle: u64,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(100)
    }
}

impl FeedState {
    pub fn new(per_page: u32) -> Self {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        Self {
            buckets: HashMap::new(),
            current_fingerprint: None,
            page: 1,
            per_page,
            default_per_page: per_page,
            loading: false,
            preloading: false,
            preloading_first_chunk: false,
            more_photos: true,
            epoch: 0,
            cycle: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn preloading(&self) -> bool {
        self.preloading
    }

    pub fn preloading_first_chunk(&self) -> bool {
        self.preloading_first_chunk
    }

    pub fn more_photos(&self) -> bool {
        self.more_photos
    }

    pub fn current_fingerprint(&self) -> Option<&Fingerprint> {
        self.current_fingerprint.as_ref()
    }

    pub fn bucket(&self, fingerprint: &Fingerprint) -> Option<&[PhotoRecord]> {
        self.buckets.get(fingerprint).map(Vec::as_slice)
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let photos = self
            .current_fingerprint
            .as_ref()
            .and_then(|fp| self.buckets.get(fp))
            .cloned()
            .unwrap_or_default();

        FeedSnapshot {
            current_fingerprint: self.current_fingerprint.clone(),
            page: self.page,
            per_page: self.per_page,
            loading: self.loading,
            preloading: self.preloading,
            preloading_first_chunk: self.preloading_first_chunk,
            more_photos: self.more_photos,
            photos,
        }
    }

    /// 取得サイクル開始。ページ番号はリセットしない
    pub(crate) fn begin_cycle(&mut self, fingerprint: Fingerprint) -> CycleTicket {
        self.cycle += 1;
        self.loading = true;
        self.preloading = true;
        self.preloading_first_chunk = true;
        self.current_fingerprint = Some(fingerprint);
        self.ticket()
    }

    /// 検索処理の終了（成否に関係なく呼ぶ）
    pub(crate) fn end_loading(&mut self, ticket: CycleTicket) {
        if self.is_current(ticket) {
            self.loading = false;
        }
    }

    /// 結果が空。このフィンガープリントはリセットまで終端
    pub(crate) fn mark_exhausted(&mut self, ticket: CycleTicket) {
        if ticket.epoch == self.epoch {
            self.more_photos = false;
        }
    }

    /// チャンクをバケットに追加。リセット前のサイクルのチャンクは捨てる
    pub(crate) fn append_chunk(
        &mut self,
        ticket: CycleTicket,
        fingerprint: &Fingerprint,
        chunk: Vec<PhotoRecord>,
    ) -> bool {
        if ticket.epoch != self.epoch {
            return false;
        }

        self.buckets
            .entry(fingerprint.clone())
            .or_default()
            .extend(chunk);

        if self.is_current(ticket) {
            self.preloading_first_chunk = false;
        }
        true
    }

    /// 全チャンクのプリロード完了
    pub(crate) fn finish_preload(&mut self, ticket: CycleTicket) {
        if self.is_current(ticket) {
            self.preloading = false;
        }
    }

    /// プリロードを開始しなかったサイクルのフラグを下ろす
    pub(crate) fn abort_preload(&mut self, ticket: CycleTicket) {
        if self.is_current(ticket) {
            self.preloading = false;
            self.preloading_first_chunk = false;
        }
    }

    /// 最初のチャンク待ちを打ち切る。変更した場合 true
    pub(crate) fn release_first_chunk(&mut self, ticket: CycleTicket) -> bool {
        if self.is_current(ticket) && self.preloading_first_chunk {
            self.preloading_first_chunk = false;
            return true;
        }
        false
    }

    pub(crate) fn increment_page(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    /// 1..=500 以外は拒否し、状態は変更しない
    pub(crate) fn set_per_page(&mut self, per_page: u32) -> Result<()> {
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(PhotoFeedError::Validation(format!(
                "per_page は 1〜{} で指定してください: {}",
                MAX_PER_PAGE, per_page
            )));
        }
        self.per_page = per_page;
        Ok(())
    }

    /// 初期状態に戻す。進行中のサイクルからの更新は以後無視される
    pub(crate) fn reset(&mut self) {
        let epoch = self.epoch + 1;
        *self = Self::new(self.default_per_page);
        self.epoch = epoch;
    }

    fn ticket(&self) -> CycleTicket {
        CycleTicket {
            epoch: self.epoch,
            cycle: self.cycle,
        }
    }

    fn is_current(&self, ticket: CycleTicket) -> bool {
        ticket == self.ticket()
    }
}
