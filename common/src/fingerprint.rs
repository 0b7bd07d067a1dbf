//! フィルタのフィンガープリント
//!
//! フィルタのスナップショットを SHA-256 でダイジェストし、結果バケットのキーにする。
//! 構造的に等しいフィルタは必ず同じ値になる。衝突は考慮しない。

use crate::filters::{FilterCriteria, FilterOption};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// フィルタのダイジェスト（16進小文字）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// フィルタのフィンガープリントを計算（副作用なし）
    pub fn of(criteria: &FilterCriteria) -> Self {
        let mut hasher = Sha256::new();

        write_text(&mut hasher, "query", criteria.query());
        write_text(&mut hasher, "author", criteria.author());

        match criteria.geo() {
            Some(geo) => {
                hasher.update(b"geo\x01");
                hasher.update(canonical_bits(geo.lat).to_be_bytes());
                hasher.update(canonical_bits(geo.lng).to_be_bytes());
            }
            None => hasher.update(b"geo\x00"),
        }

        write_options(&mut hasher, "license", criteria.licenses());
        write_options(&mut hasher, "color", criteria.colors());

        let after = criteria.date_after().map(|d| d.to_string());
        let before = criteria.date_before().map(|d| d.to_string());
        write_text(&mut hasher, "dateAfter", after.as_deref());
        write_text(&mut hasher, "dateBefore", before.as_deref());

        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 長さを前置して値の境界を曖昧にしない
fn write_text(hasher: &mut Sha256, name: &str, value: Option<&str>) {
    hasher.update(name.as_bytes());
    match value {
        Some(text) => {
            hasher.update([1u8]);
            hasher.update((text.len() as u64).to_be_bytes());
            hasher.update(text.as_bytes());
        }
        None => hasher.update([0u8]),
    }
}

fn write_options(hasher: &mut Sha256, name: &str, options: &[FilterOption]) {
    hasher.update(name.as_bytes());
    hasher.update((options.len() as u64).to_be_bytes());
    for option in options {
        write_text(hasher, "id", Some(&option.id));
        write_text(hasher, "label", Some(&option.label));
        hasher.update([option.checked as u8]);
    }
}

// -0.0 と 0.0 は等しいフィルタとして扱う
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}
