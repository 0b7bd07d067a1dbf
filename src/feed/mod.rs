//! フィード取得の制御
//!
//! 1回の取得サイクル:
//! 1. 読み込み中フラグを立て、フィルタのフィンガープリントを現在のキーにする
//! 2. クエリを組み立てて検索し、結果を正規化する
//! 3. 結果が空なら終端（`more_photos = false`）
//! 4. そうでなければチャンク単位でプリロードし、準備できたチャンクからバケットに追加する
//!
//! 検索の成否に関係なく `loading` は必ず下ろす。取得の future が途中で破棄された場合も同じ。
//! 最初のチャンクが一定時間内に来ない場合はタイマーで `preloading_first_chunk` を下ろす（プリロード自体は止めない）。
//! ページ送りはこのサイクルでは行わず、外部から `increment_page` を呼ぶ。

mod observer;
mod state;

pub use observer::{FeedObserver, LogObserver, NETWORK_NOTICE};
pub use state::{CycleTicket, FeedSnapshot, FeedState, MAX_PER_PAGE};

use crate::client::{PhotoSearch, SearchClient};
use crate::config::Config;
use crate::error::{PhotoFeedError, Result};
use crate::preload::{preload_in_chunks, HttpImageLoader, ImageLoader};
use photo_feed_common::{normalize, FilterCriteria, Fingerprint, PhotoRecord, QueryBuilder};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// 取得サイクルの設定
#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub chunk_size: usize,
    pub first_chunk_timeout: Duration,
    pub per_page: u32,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            chunk_size: 6,
            first_chunk_timeout: Duration::from_secs(5),
            per_page: 100,
        }
    }
}

impl FeedSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chunk_size: config.preload_chunk_size,
            first_chunk_timeout: config.first_chunk_timeout(),
            per_page: config.per_page,
        }
    }
}

/// 取得サイクルの結果
#[derive(Debug)]
pub enum FetchOutcome {
    /// 写真を受信し、プリロード中
    Preloading(PreloadHandle),
    /// 結果が空。リセットまで追加の写真はない
    Exhausted,
    /// 前のサイクルがまだ検索中のため何もしなかった
    InFlight,
}

/// プリロード完了時の集計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadSummary {
    pub chunks: usize,
    /// バケットに追加した写真数（リセットで捨てた分は含まない）
    pub committed: usize,
}

/// 実行中のプリロード
///
/// 破棄してもプリロードは止まらない。
#[derive(Debug)]
pub struct PreloadHandle {
    photos: usize,
    progress: mpsc::UnboundedReceiver<usize>,
    task: JoinHandle<PreloadSummary>,
}

impl PreloadHandle {
    /// このサイクルで受信した写真数
    pub fn photos(&self) -> usize {
        self.photos
    }

    /// 次にバケットへ追加されたチャンクの枚数。全チャンク終了後は `None`
    pub async fn next_chunk(&mut self) -> Option<usize> {
        self.progress.recv().await
    }

    /// 全チャンクの完了を待つ
    pub async fn wait(self) -> Result<PreloadSummary> {
        self.task
            .await
            .map_err(|e| PhotoFeedError::Preload(e.to_string()))
    }
}

/// フィード状態を所有し、取得サイクルを進める
pub struct FeedOrchestrator {
    search: Arc<dyn PhotoSearch>,
    loader: Arc<dyn ImageLoader>,
    observer: Arc<dyn FeedObserver>,
    builder: QueryBuilder,
    settings: FeedSettings,
    state: Arc<Mutex<FeedState>>,
}

impl FeedOrchestrator {
    pub fn new(
        search: Arc<dyn PhotoSearch>,
        loader: Arc<dyn ImageLoader>,
        builder: QueryBuilder,
        settings: FeedSettings,
    ) -> Self {
        let state = FeedState::new(settings.per_page);
        Self {
            search,
            loader,
            observer: Arc::new(LogObserver),
            builder,
            settings,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// 設定から Flickr クライアントと HTTP 画像ローダーを組み立てる
    pub fn from_config(config: &Config) -> Result<Self> {
        let search = SearchClient::from_config(config)?;
        let loader = HttpImageLoader::new(config.timeout())?;
        let builder = QueryBuilder::new(&config.default_search_text)
            .with_search_radius(config.search_radius);

        Ok(Self::new(
            Arc::new(search),
            Arc::new(loader),
            builder,
            FeedSettings::from_config(config),
        ))
    }

    pub fn with_observer(mut self, observer: Arc<dyn FeedObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// フィルタのフィンガープリント（状態は変更しない）
    pub fn fingerprint(&self, criteria: &FilterCriteria) -> Fingerprint {
        Fingerprint::of(criteria)
    }

    /// 取得サイクルを1回実行
    ///
    /// 通信エラー・API エラーは observer に通知したうえで返す。
    /// 通信エラーでは `more_photos` を変更しない（再試行を想定）。
    pub async fn fetch(&self, criteria: &FilterCriteria) -> Result<FetchOutcome> {
        let fingerprint = Fingerprint::of(criteria);

        let (ticket, page, per_page) = {
            let mut state = self.lock();
            if state.loading() {
                tracing::debug!("前の取得サイクルが検索中のためスキップ");
                return Ok(FetchOutcome::InFlight);
            }
            let ticket = state.begin_cycle(fingerprint.clone());
            (ticket, state.page(), state.per_page())
        };

        // 途中で future が破棄されてもフラグを下ろす
        let mut guard = CycleGuard::new(Arc::clone(&self.state), ticket);

        tracing::info!(fingerprint = %fingerprint, page, per_page, "写真を取得します");
        self.spawn_first_chunk_timer(ticket);

        let result = self.run_cycle(criteria, fingerprint, ticket, page, per_page).await;

        if matches!(result, Ok(FetchOutcome::Preloading(_))) {
            guard.keep_preload();
        }
        drop(guard);

        if let Err(e) = &result {
            self.report(e);
        }
        result
    }

    /// 次の取得で使うページを進める
    pub fn increment_page(&self) {
        self.lock().increment_page();
    }

    /// 1ページの件数を変更（不正な値は状態を変えずに拒否）
    pub fn set_per_page(&self, per_page: u32) -> Result<()> {
        self.lock().set_per_page(per_page)
    }

    /// 状態を初期化。フィルタ変更を検知した側が呼ぶ
    pub fn reset(&self) {
        self.lock().reset();
        tracing::debug!("フィード状態をリセット");
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.lock().snapshot()
    }

    /// 現在のフィンガープリントのバケット
    pub fn current_bucket(&self) -> Vec<PhotoRecord> {
        self.snapshot().photos
    }

    pub fn bucket(&self, fingerprint: &Fingerprint) -> Option<Vec<PhotoRecord>> {
        self.lock().bucket(fingerprint).map(<[PhotoRecord]>::to_vec)
    }

    async fn run_cycle(
        &self,
        criteria: &FilterCriteria,
        fingerprint: Fingerprint,
        ticket: CycleTicket,
        page: u32,
        per_page: u32,
    ) -> Result<FetchOutcome> {
        let params = self.builder.build(criteria).with_page(page, per_page);
        let payload = self.search.search(&params).await?;
        let records = normalize(payload.as_ref());

        if records.is_empty() {
            tracing::info!(page, "これ以上の写真はありません");
            self.lock().mark_exhausted(ticket);
            return Ok(FetchOutcome::Exhausted);
        }

        tracing::debug!(count = records.len(), "写真を受信、プリロード開始");
        Ok(FetchOutcome::Preloading(
            self.spawn_preload(ticket, fingerprint, records),
        ))
    }

    fn spawn_preload(
        &self,
        ticket: CycleTicket,
        fingerprint: Fingerprint,
        records: Vec<PhotoRecord>,
    ) -> PreloadHandle {
        let photos = records.len();
        let loader = Arc::clone(&self.loader);
        let state = Arc::clone(&self.state);
        let chunk_size = self.settings.chunk_size;
        let (progress_tx, progress) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            let (chunk_tx, mut chunk_rx) = mpsc::unbounded_channel();

            let preload = async move {
                let chunks = preload_in_chunks(loader.as_ref(), records, chunk_size, &chunk_tx).await;
                drop(chunk_tx);
                chunks.len()
            };

            // チャンクは準備できた順にバケットへ
            let commit = async {
                let mut committed = 0;
                while let Some(chunk) = chunk_rx.recv().await {
                    let size = chunk.len();
                    let accepted = lock(&state).append_chunk(ticket, &fingerprint, chunk);
                    if accepted {
                        committed += size;
                        let _ = progress_tx.send(size);
                    }
                }
                committed
            };

            let (chunks, committed) = tokio::join!(preload, commit);
            lock(&state).finish_preload(ticket);
            tracing::debug!(chunks, committed, "プリロード完了");

            PreloadSummary { chunks, committed }
        });

        PreloadHandle {
            photos,
            progress,
            task,
        }
    }

    // 最初のチャンクを待ち続けないための保険。プリロードは止めない
    fn spawn_first_chunk_timer(&self, ticket: CycleTicket) {
        let state = Arc::clone(&self.state);
        let timeout = self.settings.first_chunk_timeout;

        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if lock(&state).release_first_chunk(ticket) {
                tracing::debug!("最初のチャンク待ちを打ち切りました");
            }
        });
    }

    fn report(&self, error: &PhotoFeedError) {
        if error.is_network() {
            self.observer.network_unavailable(NETWORK_NOTICE, error);
        } else {
            self.observer.fatal(error);
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        lock(&self.state)
    }
}

/// 取得サイクルの後始末
///
/// 破棄時に `loading` を下ろす。プリロードを開始しなかった場合は
/// プリロード関連のフラグも下ろす。
struct CycleGuard {
    state: Arc<Mutex<FeedState>>,
    ticket: CycleTicket,
    preload_started: bool,
}

impl CycleGuard {
    fn new(state: Arc<Mutex<FeedState>>, ticket: CycleTicket) -> Self {
        Self {
            state,
            ticket,
            preload_started: false,
        }
    }

    fn keep_preload(&mut self) {
        self.preload_started = true;
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        state.end_loading(self.ticket);
        if !self.preload_started {
            state.abort_preload(self.ticket);
        }
    }
}

fn lock(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
