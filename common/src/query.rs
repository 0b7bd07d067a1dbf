//! 検索クエリ生成
//!
//! フィルタから Flickr 検索パラメータを組み立てる純粋関数。
//! 各条件（テキスト・作者・位置・ライセンス・カラー・日付）を個別に計算し、
//! 決まった順序でマージする。ページ番号は呼び出し側で付与する。

use crate::filters::FilterCriteria;
use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;

/// 検索時のデフォルト半径（km）
pub const DEFAULT_SEARCH_RADIUS: u32 = 5;

/// 送信用パラメータ（値はエンコード済みの文字列）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    params: BTreeMap<String, String>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// エンコード済みの値をそのまま設定
    pub fn insert_raw(&mut self, key: &str, value: impl Into<String>) {
        self.params.insert(key.to_string(), value.into());
    }

    /// 値をパーセントエンコードして設定
    pub fn insert(&mut self, key: &str, value: &str) {
        self.insert_raw(key, urlencoding::encode(value).into_owned());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// 後からマージした側が同じキーを上書きする
    pub fn merge(&mut self, other: ParameterSet) {
        self.params.extend(other.params);
    }

    /// ページ番号と件数を付与
    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.insert_raw("page", page.to_string());
        self.insert_raw("per_page", per_page.to_string());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `key=value&...` 形式（値はそのまま書き出す）
    pub fn to_query_string(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// 検索クエリビルダー
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    default_text: String,
    search_radius: u32,
}

impl QueryBuilder {
    pub fn new(default_text: impl Into<String>) -> Self {
        Self {
            default_text: default_text.into(),
            search_radius: DEFAULT_SEARCH_RADIUS,
        }
    }

    pub fn with_search_radius(mut self, radius: u32) -> Self {
        self.search_radius = radius;
        self
    }

    pub fn default_text(&self) -> &str {
        &self.default_text
    }

    /// フィルタから検索パラメータを生成
    pub fn build(&self, criteria: &FilterCriteria) -> ParameterSet {
        let mut params = ParameterSet::new();

        params.merge(self.text_param(criteria));
        params.merge(author_param(criteria));
        params.merge(self.geo_params(criteria));
        params.merge(joined_param("license", &criteria.checked_licenses()));
        params.merge(joined_param("color_codes", &criteria.checked_colors()));
        params.merge(date_params(criteria));

        params
    }

    fn text_param(&self, criteria: &FilterCriteria) -> ParameterSet {
        let mut params = ParameterSet::new();

        if let Some(query) = criteria.query().filter(|q| !q.is_empty()) {
            params.insert_raw(
                "text",
                format!(
                    "{}+{}",
                    urlencoding::encode(&self.default_text),
                    urlencoding::encode(query)
                ),
            );
        }

        params
    }

    fn geo_params(&self, criteria: &FilterCriteria) -> ParameterSet {
        let mut params = ParameterSet::new();

        // 不正・不完全な座標は何も追加しない（エラーにしない）
        if let Some(geo) = criteria.geo().filter(|g| g.is_finite()) {
            params.insert_raw("has_geo", "1");
            params.insert_raw("radius", self.search_radius.to_string());
            params.insert_raw("lat", geo.lat.to_string());
            params.insert_raw("lon", geo.lng.to_string());
        }

        params
    }
}

fn author_param(criteria: &FilterCriteria) -> ParameterSet {
    let mut params = ParameterSet::new();

    if let Some(author) = criteria.author().filter(|a| !a.is_empty()) {
        params.insert("user_id", author);
    }

    params
}

fn joined_param(key: &str, ids: &[&str]) -> ParameterSet {
    let mut params = ParameterSet::new();

    if !ids.is_empty() {
        params.insert_raw(key, ids.join(","));
    }

    params
}

// dateAfter / dateBefore は境界を含まないので1日ずらす
fn date_params(criteria: &FilterCriteria) -> ParameterSet {
    let mut params = ParameterSet::new();

    if let Some(date) = criteria.date_after().and_then(|d| d.checked_add_days(Days::new(1))) {
        params.insert("min_upload_date", &format_date(date));
    }

    if let Some(date) = criteria.date_before().and_then(|d| d.checked_sub_days(Days::new(1))) {
        params.insert("max_upload_date", &format_date(date));
    }

    params
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
