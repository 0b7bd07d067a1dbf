//! 検索フィルタ
//!
//! フィールドは非公開で、更新は検証付きの操作からのみ行う。
//! 検証に失敗した更新は `Error::Validation` を返し、状態は一切変更しない。

use crate::catalog;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 日付フィルタの入力形式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// チェック可能な選択肢（ライセンス・カラー）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub id: String,
    pub label: String,
    pub checked: bool,
}

impl FilterOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            checked: false,
        }
    }
}

/// 位置情報フィルタ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// 両方の座標が有限値か
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// 検索フィルタのスナップショット
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCriteria {
    query: Option<String>,
    author: Option<String>,
    geo: Option<GeoPoint>,
    licenses: Vec<FilterOption>,
    colors: Vec<FilterOption>,
    date_after: Option<NaiveDate>,
    date_before: Option<NaiveDate>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self::new(catalog::licenses(), catalog::colors())
    }
}

impl FilterCriteria {
    /// 任意の選択肢一覧でフィルタを作成
    pub fn new(licenses: Vec<FilterOption>, colors: Vec<FilterOption>) -> Self {
        Self {
            query: None,
            author: None,
            geo: None,
            licenses,
            colors,
            date_after: None,
            date_before: None,
        }
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn geo(&self) -> Option<GeoPoint> {
        self.geo
    }

    pub fn licenses(&self) -> &[FilterOption] {
        &self.licenses
    }

    pub fn colors(&self) -> &[FilterOption] {
        &self.colors
    }

    pub fn date_after(&self) -> Option<NaiveDate> {
        self.date_after
    }

    pub fn date_before(&self) -> Option<NaiveDate> {
        self.date_before
    }

    /// チェック済みライセンスID（一覧の順序）
    pub fn checked_licenses(&self) -> Vec<&str> {
        checked_ids(&self.licenses)
    }

    /// チェック済みカラーID（一覧の順序）
    pub fn checked_colors(&self) -> Vec<&str> {
        checked_ids(&self.colors)
    }

    pub fn set_query(&mut self, value: &str) {
        self.query = Some(value.to_string());
    }

    pub fn set_author(&mut self, value: &str) {
        self.author = Some(value.to_string());
    }

    /// 文字列の座標を設定。両方とも有限の数値でなければ拒否する
    pub fn set_geo(&mut self, lat: &str, lng: &str) -> Result<()> {
        let lat = parse_coordinate("lat", lat)?;
        let lng = parse_coordinate("lng", lng)?;
        self.geo = Some(GeoPoint { lat, lng });
        Ok(())
    }

    pub fn set_geo_point(&mut self, point: GeoPoint) -> Result<()> {
        if !point.is_finite() {
            return Err(Error::Validation(format!(
                "geo must have finite coordinates, got lat={} lng={}",
                point.lat, point.lng
            )));
        }
        self.geo = Some(point);
        Ok(())
    }

    pub fn clear_geo(&mut self) {
        self.geo = None;
    }

    pub fn set_license(&mut self, id: &str, checked: bool) -> Result<()> {
        set_checked(&mut self.licenses, "license", id, checked)
    }

    pub fn set_color(&mut self, id: &str, checked: bool) -> Result<()> {
        set_checked(&mut self.colors, "color", id, checked)
    }

    /// `yyyy-MM-dd` 形式、または `None` でクリア
    pub fn set_date_after(&mut self, value: Option<&str>) -> Result<()> {
        self.date_after = value.map(|v| parse_date("dateAfter", v)).transpose()?;
        Ok(())
    }

    pub fn set_date_before(&mut self, value: Option<&str>) -> Result<()> {
        self.date_before = value.map(|v| parse_date("dateBefore", v)).transpose()?;
        Ok(())
    }

    /// 初期状態に戻す（選択肢は未チェックの新しいコピー）
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn checked_ids(options: &[FilterOption]) -> Vec<&str> {
    options
        .iter()
        .filter(|o| o.checked)
        .map(|o| o.id.as_str())
        .collect()
}

fn set_checked(options: &mut [FilterOption], field: &str, id: &str, checked: bool) -> Result<()> {
    let option = options
        .iter_mut()
        .find(|o| o.id == id)
        .ok_or_else(|| Error::Validation(format!("unknown {} id \"{}\"", field, id)))?;
    option.checked = checked;
    Ok(())
}

fn parse_coordinate(field: &str, value: &str) -> Result<f64> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(Error::Validation(format!(
            "geo {} must be a finite number, got \"{}\"",
            field, value
        ))),
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        Error::Validation(format!("{} must be yyyy-MM-dd, got \"{}\"", field, value))
    })
}
