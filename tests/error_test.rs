//! エラーケーステスト
//!
//! 入力値の検証エラーとエラー表示を確認

use photo_feed::cli::FilterArgs;
use photo_feed::common::{FilterCriteria, GeoPoint};
use photo_feed::error::PhotoFeedError;

/// 数値でない座標は拒否され、フィルタは変わらない
#[test]
fn test_invalid_geo_is_rejected() {
    let mut criteria = FilterCriteria::default();
    let result = criteria.set_geo("north", "151.2");

    assert!(result.is_err());
    assert!(criteria.geo().is_none());
}

#[test]
fn test_non_finite_geo_is_rejected() {
    let mut criteria = FilterCriteria::default();
    assert!(criteria
        .set_geo_point(GeoPoint { lat: f64::NAN, lng: 0.0 })
        .is_err());
}

/// 日付の形式は yyyy-MM-dd のみ
#[test]
fn test_invalid_date_is_validation_error() {
    let args = FilterArgs {
        before: Some("2020/01/10".to_string()),
        ..Default::default()
    };
    let err = args.to_criteria().unwrap_err();
    assert!(matches!(err, PhotoFeedError::Validation(_)));
}

#[test]
fn test_unknown_license_is_validation_error() {
    let args = FilterArgs {
        licenses: vec!["99".to_string()],
        ..Default::default()
    };
    assert!(matches!(
        args.to_criteria(),
        Err(PhotoFeedError::Validation(_))
    ));
}

/// PhotoFeedErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        PhotoFeedError::Config("テスト設定エラー".to_string()),
        PhotoFeedError::MissingApiKey,
        PhotoFeedError::Network("connection refused".to_string()),
        PhotoFeedError::api("HTTP 503"),
        PhotoFeedError::Validation("per_page".to_string()),
        PhotoFeedError::Preload("task panicked".to_string()),
    ];

    for err in errors {
        let message = err.to_string();
        assert!(!message.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: PhotoFeedError = io.into();
    assert!(matches!(err, PhotoFeedError::Io(_)));
    assert!(!err.is_network());
}
