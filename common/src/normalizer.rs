//! 検索結果の正規化
//!
//! Flickr の生レコードを PhotoRecord に変換する。順序は維持し、失敗しない。

use crate::types::{PhotoRecord, RawPhoto, SearchPayload};

/// 検索結果を PhotoRecord の列に変換
///
/// `None` の場合は空の列を返す。
pub fn normalize(payload: Option<&SearchPayload>) -> Vec<PhotoRecord> {
    match payload {
        Some(payload) => payload.photo.iter().map(normalize_photo).collect(),
        None => Vec::new(),
    }
}

/// 生レコード1件を変換
///
/// 中サイズ(m)の URL がない場合は URL・幅・高さをまとめてオリジナル(o)に切り替える。
/// 中サイズの幅とオリジナルの URL が混ざることはない。
pub fn normalize_photo(raw: &RawPhoto) -> PhotoRecord {
    let has_medium = raw.url_m.as_deref().is_some_and(|url| !url.is_empty());

    let (image_url, width, height) = if has_medium {
        (raw.url_m.clone(), raw.width_m, raw.height_m)
    } else {
        (raw.url_o.clone(), raw.width_o, raw.height_o)
    };

    PhotoRecord {
        id: raw.id.clone().unwrap_or_default(),
        upload_timestamp: raw.dateupload,
        title: raw.title.clone().unwrap_or_default(),
        author: raw.ownername.clone().unwrap_or_default(),
        author_id: raw.owner.clone().unwrap_or_default(),
        description: raw.description.clone().unwrap_or_default(),
        image_url: image_url.unwrap_or_default(),
        thumbnail_url: raw.url_sq.clone().unwrap_or_default(),
        width,
        height,
        lat: raw.latitude,
        lng: raw.longitude,
    }
}
