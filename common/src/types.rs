//! 写真データの型定義
//!
//! - RawPhoto / SearchPayload: Flickr 検索レスポンスの生データ
//! - PhotoRecord: 正規化済みの写真（フィードの単位）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 検索レスポンスの `photos` 部分
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchPayload {
    #[serde(deserialize_with = "loose_u32")]
    pub page: Option<u32>,
    #[serde(deserialize_with = "loose_u32")]
    pub pages: Option<u32>,
    #[serde(deserialize_with = "loose_u32")]
    pub perpage: Option<u32>,
    #[serde(deserialize_with = "loose_u32")]
    pub total: Option<u32>,
    #[serde(deserialize_with = "loose_photos")]
    pub photo: Vec<RawPhoto>,
}

/// Flickr の写真レコード（extras 付き）
///
/// Flickr は数値を文字列で返すことがあるため、数値・文字列どちらも受け付ける。
/// 使えない値は `None` になり、レスポンス全体は失敗させない。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPhoto {
    #[serde(deserialize_with = "loose_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub owner: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub ownername: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "loose_i64")]
    pub dateupload: Option<i64>,
    #[serde(deserialize_with = "loose_description")]
    pub description: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub url_m: Option<String>,
    #[serde(deserialize_with = "loose_u32")]
    pub width_m: Option<u32>,
    #[serde(deserialize_with = "loose_u32")]
    pub height_m: Option<u32>,
    #[serde(deserialize_with = "loose_string")]
    pub url_o: Option<String>,
    #[serde(deserialize_with = "loose_u32")]
    pub width_o: Option<u32>,
    #[serde(deserialize_with = "loose_u32")]
    pub height_o: Option<u32>,
    #[serde(deserialize_with = "loose_string")]
    pub url_sq: Option<String>,
    #[serde(deserialize_with = "loose_f64")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "loose_f64")]
    pub longitude: Option<f64>,
}

/// 正規化済みの写真
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub id: String,
    pub upload_timestamp: Option<i64>,
    pub title: String,
    pub author: String,
    pub author_id: String,
    pub description: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl PhotoRecord {
    /// アップロード日時
    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        self.upload_timestamp
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
    }

    /// アップロード日（yyyy-MM-dd）
    pub fn upload_date_label(&self) -> Option<String> {
        self.uploaded_at().map(|dt| dt.format("%Y-%m-%d").to_string())
    }

    /// 位置情報あり（Flickr は位置なしを 0,0 で返す）
    pub fn has_location(&self) -> bool {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => !(lat == 0.0 && lng == 0.0),
            _ => false,
        }
    }
}

// オブジェクトでない要素は読み飛ばす。配列以外は空として扱う
fn loose_photos<'de, D>(deserializer: D) -> Result<Vec<RawPhoto>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

// `{"_content": "..."}` 形式。文字列がそのまま来た場合も受け付ける
fn loose_description<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(mut map) => match map.remove("_content") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn loose_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

fn loose_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

fn loose_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_photo_accepts_strings_and_numbers() {
        let json = r#"{
            "id": 5301,
            "owner": "12@N01",
            "dateupload": "1577836800",
            "width_m": "500",
            "height_m": 375,
            "latitude": 52.2,
            "longitude": "21.0",
            "description": {"_content": "<b>Warsaw</b>"}
        }"#;
        let raw: RawPhoto = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(raw.id.as_deref(), Some("5301"));
        assert_eq!(raw.dateupload, Some(1577836800));
        assert_eq!(raw.width_m, Some(500));
        assert_eq!(raw.height_m, Some(375));
        assert_eq!(raw.latitude, Some(52.2));
        assert_eq!(raw.longitude, Some(21.0));
        assert_eq!(raw.description.as_deref(), Some("<b>Warsaw</b>"));
    }

    #[test]
    fn test_raw_photo_unusable_values_become_none() {
        let json = r#"{"id": "1", "width_m": "wide", "latitude": {"x": 1}, "title": null, "description": 7}"#;
        let raw: RawPhoto = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(raw.description, None);
        assert_eq!(raw.width_m, None);
        assert_eq!(raw.latitude, None);
        assert_eq!(raw.title, None);
    }

    #[test]
    fn test_payload_skips_non_object_records() {
        let json = r#"{"page": 1, "photo": [{"id": "1"}, null, "2", 3, {"id": "4"}]}"#;
        let payload: SearchPayload = serde_json::from_str(json).expect("デシリアライズ失敗");
        let ids: Vec<_> = payload.photo.iter().map(|p| p.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("1"), Some("4")]);
    }

    #[test]
    fn test_payload_photo_not_array_is_empty() {
        let payload: SearchPayload =
            serde_json::from_str(r#"{"page": 1, "photo": {"id": "1"}}"#).expect("デシリアライズ失敗");
        assert!(payload.photo.is_empty());
        assert_eq!(payload.page, Some(1));
    }

    #[test]
    fn test_payload_defaults() {
        let payload: SearchPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.photo.is_empty());
        assert_eq!(payload.page, None);
    }

    #[test]
    fn test_upload_date_label() {
        let record = PhotoRecord {
            upload_timestamp: Some(1577836800),
            ..Default::default()
        };
        assert_eq!(record.upload_date_label().as_deref(), Some("2020-01-01"));
        assert!(PhotoRecord::default().uploaded_at().is_none());
    }

    #[test]
    fn test_has_location() {
        let mut record = PhotoRecord {
            lat: Some(0.0),
            lng: Some(0.0),
            ..Default::default()
        };
        assert!(!record.has_location());
        record.lat = Some(52.2);
        assert!(record.has_location());
    }

    #[test]
    fn test_photo_record_serialize_camel_case() {
        let record = PhotoRecord {
            id: "1".to_string(),
            author_id: "12@N01".to_string(),
            image_url: "https://example.com/1.jpg".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&record).expect("シリアライズ失敗");
        assert!(json.contains("\"authorId\":\"12@N01\""));
        assert!(json.contains("\"imageUrl\":\"https://example.com/1.jpg\""));
    }
}
