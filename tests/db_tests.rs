use serde_json::json;
use webcarros_client::WebCarros;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn listing_row(id: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "name": "ONIX 1.0",
        "model": "1.0 Flex Plus Manual",
        "year": "2016/2016",
        "km": "23.900",
        "price": "69.000",
        "city": "Florianopolis",
        "whatsapp": "01112345678",
        "description": "Well maintained",
        "created": "2026-08-20T12:00:00Z",
        "owner": "Ana",
        "uid": "user-1",
        "images": [
            { "name": "img-1", "uid": "user-1", "url": "http://example.com/img-1" }
        ]
    })
}

#[tokio::test]
async fn create_record_returns_the_assigned_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/cars"))
        .and(header("Prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": 42 }])))
        .mount(&mock_server)
        .await;

    let client = WebCarros::new(&mock_server.uri(), "test_anon_key");

    let id = client
        .db()
        .create_record("cars", &json!({ "name": "ONIX" }))
        .await
        .unwrap();

    assert_eq!(id, "42");
}

#[tokio::test]
async fn create_record_handles_string_keys() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/cars"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([{ "id": "b7b9e2c0-1" }])),
        )
        .mount(&mock_server)
        .await;

    let client = WebCarros::new(&mock_server.uri(), "test_anon_key");

    let id = client
        .db()
        .create_record("cars", &json!({ "name": "ONIX" }))
        .await
        .unwrap();

    assert_eq!(id, "b7b9e2c0-1");
}

#[tokio::test]
async fn create_record_surfaces_write_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/cars"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = WebCarros::new(&mock_server.uri(), "test_anon_key");

    let result = client.db().create_record("cars", &json!({})).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn listings_get_fetches_a_persisted_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/cars"))
        .and(query_param("id", "eq.42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([listing_row(json!(42))])))
        .mount(&mock_server)
        .await;

    let client = WebCarros::new(&mock_server.uri(), "test_anon_key");

    let listing = client.listings().get("42").await.unwrap().unwrap();

    assert_eq!(listing.id, "42");
    assert_eq!(listing.name, "ONIX 1.0");
    assert_eq!(listing.owner, "Ana");
    assert_eq!(listing.images.len(), 1);
    assert_eq!(listing.images[0].url, "http://example.com/img-1");
}

#[tokio::test]
async fn listings_get_returns_none_for_a_missing_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/cars"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let client = WebCarros::new(&mock_server.uri(), "test_anon_key");

    let listing = client.listings().get("missing").await.unwrap();

    assert!(listing.is_none());
}
