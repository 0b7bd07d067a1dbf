//! 表示用テキスト処理
//!
//! Flickr の説明文は HTML を含むため、タグを除去してから切り詰める。

use regex::Regex;

/// 切り詰め時のデフォルト接尾辞
pub const DEFAULT_SUFFIX: &str = "...";

/// HTML タグを除去し、よく使われる実体参照を戻す
pub fn strip_html(html: &str) -> String {
    lazy_static::lazy_static! {
        static ref TAG_RE: Regex = Regex::new(r"<[^>]*>").unwrap();
    }

    TAG_RE
        .replace_all(html, "")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// テキストを `length` 文字で切り詰め、切り詰めた場合のみ接尾辞を付ける
pub fn truncate(html: &str, length: usize, suffix: &str) -> String {
    let content = strip_html(html);

    if content.chars().count() > length {
        let head: String = content.chars().take(length).collect();
        format!("{}{}", head, suffix)
    } else {
        content
    }
}
