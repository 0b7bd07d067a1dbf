//! Flickr 写真フィードの取得とチャンク単位のプリロード
//!
//! フィルタごとに結果をバケットに分け、ページ単位で取得した写真を
//! 準備できたチャンクから順に公開する。

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod feed;
pub mod logger;
pub mod preload;

pub use photo_feed_common as common;
