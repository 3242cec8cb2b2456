//! Integration tests for GeocodingClient: forward search and reverse lookup
//! with its mandatory coordinate fallback.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cirrus_weather::{Coordinates, GeocodingClient};

fn client_for(server: &MockServer) -> GeocodingClient {
    GeocodingClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_search_maps_results_and_caps_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Lisbon"))
        .and(query_param("count", "10"))
        .and(query_param("language", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "name": "Lisbon",
                    "latitude": 38.7167,
                    "longitude": -9.1333,
                    "country": "Portugal",
                    "admin1": "Lisbon"
                },
                {
                    "name": "Lisbon",
                    "latitude": 44.0309,
                    "longitude": -70.1045,
                    "country": "United States",
                    "admin1": "Maine",
                    "admin2": "Androscoggin"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = client_for(&server).search_locations("Lisbon").await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].name, "Lisbon");
    assert_eq!(results[0].country.as_deref(), Some("Portugal"));
    assert_eq!(results[1].admin2.as_deref(), Some("Androscoggin"));
}

#[tokio::test]
async fn test_search_without_results_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let results = client_for(&server)
        .search_locations("Xyzzyville")
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_whitespace_query_never_hits_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let results = client_for(&server).search_locations("  \t ").await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_reverse_prefers_finest_admin_qualifier() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .and(query_param("language", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "name": "Charlottenburg",
                "latitude": 52.5163,
                "longitude": 13.3041,
                "country": "Germany",
                "admin1": "Berlin",
                "admin2": "Berlin",
                "admin3": "Charlottenburg-Wilmersdorf"
            }]
        })))
        .mount(&server)
        .await;

    let coords = Coordinates::new(52.5163, 13.3041).unwrap();
    let name = client_for(&server).reverse_geocode(&coords).await;
    assert_eq!(name, "Charlottenburg, Charlottenburg-Wilmersdorf");
}

#[tokio::test]
async fn test_reverse_empty_results_falls_back_to_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;

    let coords = Coordinates::new(12.34, 45.67).unwrap();
    let name = client_for(&server).reverse_geocode(&coords).await;
    assert_eq!(name, "Location (12.3400, 45.6700)");
}

#[tokio::test]
async fn test_reverse_server_error_falls_back_to_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let coords = Coordinates::new(-33.868819, 151.209295).unwrap();
    let name = client_for(&server).reverse_geocode(&coords).await;
    assert_eq!(name, "Location (-33.8688, 151.2093)");
}
