//! 検索クライアントのテスト
//!
//! モックサーバーで応答の分類（Network / Api）と共通パラメータの付与を検証

use photo_feed::client::{PhotoSearch, SearchClient};
use photo_feed::common::{FilterCriteria, ParameterSet, QueryBuilder};
use photo_feed::error::PhotoFeedError;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> SearchClient {
    SearchClient::new(server.uri(), "test-key", "dog", Duration::from_secs(2))
        .expect("クライアント作成失敗")
}

fn ok_body() -> serde_json::Value {
    json!({
        "photos": {
            "page": 2,
            "pages": 10,
            "perpage": 50,
            "total": "500",
            "photo": [
                {"id": "1", "owner": "12@N01", "title": "first", "url_m": "https://img.example.com/1.jpg"},
                {"id": "2", "owner": "12@N01", "title": "second", "url_o": "https://img.example.com/2.jpg"}
            ]
        },
        "stat": "ok"
    })
}

/// 共通パラメータ・APIキー・ページ番号が付与される
#[tokio::test]
async fn test_search_sends_defaults_and_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("format", "json"))
        .and(query_param("nojsoncallback", "1"))
        .and(query_param("method", "flickr.photos.search"))
        .and(query_param("text", "dog"))
        .and(query_param("license", "4"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut criteria = FilterCriteria::default();
    criteria.set_license("4", true).unwrap();
    let params = QueryBuilder::new("dog").build(&criteria).with_page(2, 50);

    let payload = client(&server)
        .search(&params)
        .await
        .expect("検索失敗")
        .expect("photos がない");

    assert_eq!(payload.photo.len(), 2);
    assert_eq!(payload.page, Some(2));
    assert_eq!(payload.total, Some(500));
}

/// 呼び出し側の text がデフォルト検索語より優先される
#[tokio::test]
async fn test_caller_text_overrides_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("text", "dog cat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut criteria = FilterCriteria::default();
    criteria.set_query("cat");
    let params = QueryBuilder::new("dog").build(&criteria);

    assert!(client(&server).search(&params).await.is_ok());
}

/// エンコード済みの値は一度だけデコードされて届く
#[tokio::test]
async fn test_encoded_values_are_not_encoded_twice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("user_id", "12345@N01"))
        .and(query_param("text", "dog golden retriever"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut criteria = FilterCriteria::default();
    criteria.set_author("12345@N01");
    criteria.set_query("golden retriever");
    let params = QueryBuilder::new("dog").build(&criteria);
    assert_eq!(params.get("user_id"), Some("12345%40N01"));

    assert!(client(&server).search(&params).await.is_ok());
}

/// stat が ok でも photos がなければ None
#[tokio::test]
async fn test_missing_photos_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stat": "ok"})))
        .mount(&server)
        .await;

    let result = client(&server).search(&ParameterSet::new()).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_http_error_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(ok_body()))
        .mount(&server)
        .await;

    let err = client(&server).search(&ParameterSet::new()).await.unwrap_err();
    assert!(err.is_api(), "Api エラーではない: {:?}", err);
}

#[tokio::test]
async fn test_non_json_content_type_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&server)
        .await;

    let err = client(&server).search(&ParameterSet::new()).await.unwrap_err();
    assert!(err.is_api());
}

#[tokio::test]
async fn test_json_content_type_with_charset_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(ok_body().to_string(), "application/json; charset=utf-8"),
        )
        .mount(&server)
        .await;

    assert!(client(&server).search(&ParameterSet::new()).await.is_ok());
}

#[tokio::test]
async fn test_malformed_json_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{\"stat\": ", "application/json"))
        .mount(&server)
        .await;

    let err = client(&server).search(&ParameterSet::new()).await.unwrap_err();
    assert!(err.is_api());
}

/// stat=fail はサービスのコードとメッセージを持つ
#[tokio::test]
async fn test_failed_stat_carries_service_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stat": "fail",
            "code": 100,
            "message": "Invalid API Key (Key has invalid format)"
        })))
        .mount(&server)
        .await;

    let err = client(&server).search(&ParameterSet::new()).await.unwrap_err();
    match err {
        PhotoFeedError::Api { code, message } => {
            assert_eq!(code, Some(100));
            assert!(message.contains("Invalid API Key"));
        }
        other => panic!("Api エラーではない: {:?}", other),
    }
}

/// 応答がタイムアウトした場合は Network
#[tokio::test]
async fn test_timeout_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = SearchClient::new(server.uri(), "test-key", "dog", Duration::from_millis(200))
        .unwrap();
    let err = client.search(&ParameterSet::new()).await.unwrap_err();
    assert!(err.is_network(), "Network エラーではない: {:?}", err);
}

/// 接続できない場合も Network
#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = SearchClient::new(
        format!("http://{}", addr),
        "test-key",
        "dog",
        Duration::from_secs(2),
    )
    .unwrap();
    let err = client.search(&ParameterSet::new()).await.unwrap_err();
    assert!(err.is_network());
}
