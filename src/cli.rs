use crate::error::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use photo_feed_common::FilterCriteria;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photo-feed")]
#[command(about = "Flickr写真フィードの取得・プリロードツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// フィルタで写真を検索し、プリロードしながらページを取得
    Search {
        #[command(flatten)]
        filters: FilterArgs,

        /// 取得するページ数
        #[arg(short, long, default_value = "1")]
        pages: u32,

        /// 1ページの件数（1〜500、省略時は設定値）
        #[arg(long)]
        per_page: Option<u32>,

        /// 結果を書き出すJSONファイル
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// ライセンス・カラーの選択肢を表示
    Options {
        #[arg(default_value = "licenses")]
        kind: OptionKind,
    },

    /// 設定を管理
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OptionKind {
    Licenses,
    Colors,
}

/// 検索フィルタの引数
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// 検索語
    #[arg(short, long)]
    pub query: Option<String>,

    /// 作者（Flickr ユーザーID）
    #[arg(short, long)]
    pub author: Option<String>,

    /// 緯度（--lng と同時に指定）
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<String>,

    /// 経度
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<String>,

    /// ライセンスID（複数指定可）
    #[arg(long = "license")]
    pub licenses: Vec<String>,

    /// カラーコードID（複数指定可）
    #[arg(long = "color")]
    pub colors: Vec<String>,

    /// この日より後にアップロード（yyyy-MM-dd、当日は含まない）
    #[arg(long)]
    pub after: Option<String>,

    /// この日より前にアップロード（yyyy-MM-dd、当日は含まない）
    #[arg(long)]
    pub before: Option<String>,
}

impl FilterArgs {
    /// 引数をフィルタに変換。不正な値は `Validation` エラー
    pub fn to_criteria(&self) -> Result<FilterCriteria> {
        let mut criteria = FilterCriteria::default();

        if let Some(query) = &self.query {
            criteria.set_query(query);
        }
        if let Some(author) = &self.author {
            criteria.set_author(author);
        }
        if let (Some(lat), Some(lng)) = (&self.lat, &self.lng) {
            criteria.set_geo(lat, lng)?;
        }
        for id in &self.licenses {
            criteria.set_license(id, true)?;
        }
        for id in &self.colors {
            criteria.set_color(id, true)?;
        }
        criteria.set_date_after(self.after.as_deref())?;
        criteria.set_date_before(self.before.as_deref())?;

        Ok(criteria)
    }
}
