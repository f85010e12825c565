use descuentos_uy::domain::ports::PlacesProvider;
use descuentos_uy::{AppError, GooglePlacesClient};
use httpmock::prelude::*;
use serde_json::json;

#[tokio::test]
async fn test_place_details_requests_cached_fields() {
    let server = MockServer::start();
    let details = server.mock(|when, then| {
        when.method(GET)
            .path("/place/details/json")
            .query_param("place_id", "ChIJ123")
            .query_param(
                "fields",
                "geometry,formatted_phone_number,rating,user_ratings_total,price_level,opening_hours",
            )
            .query_param("key", "maps-key");
        then.status(200).json_body(json!({
            "status": "OK",
            "result": {
                "formatted_phone_number": "2915 0000",
                "rating": 4.4,
                "user_ratings_total": 321,
                "opening_hours": {"open_now": true, "weekday_text": ["Monday: 9:00 AM – 6:00 PM"]},
                "geometry": {"location": {"lat": -34.9077, "lng": -56.2006}}
            }
        }));
    });

    let client = GooglePlacesClient::new(&server.base_url(), Some("maps-key"), "UY");
    assert!(client.has_credentials());

    let response = client.place_details("ChIJ123").await.unwrap();
    details.assert();

    let result = response.into_details().unwrap();
    assert_eq!(result.rating, Some(4.4));
    assert_eq!(result.geometry.unwrap().location.lng, -56.2006);
}

#[tokio::test]
async fn test_missing_key_fails_without_request() {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.any_request();
        then.status(200);
    });

    let client = GooglePlacesClient::new(&server.base_url(), None, "UY");
    assert!(!client.has_credentials());

    let err = client.place_details("ChIJ123").await.unwrap_err();
    assert!(matches!(err, AppError::MissingConfigError { .. }));
    any.assert_hits(0);
}

#[tokio::test]
async fn test_geocode_restricts_country() {
    let server = MockServer::start();
    let geocode = server.mock(|when, then| {
        when.method(GET)
            .path("/geocode/json")
            .query_param("address", "Charrua 2515, Montevideo")
            .query_param("components", "country:UY");
        then.status(200).json_body(json!({
            "status": "OK",
            "results": [{
                "formatted_address": "Charrúa 2515, 11300 Montevideo",
                "geometry": {"location": {"lat": -34.9087, "lng": -56.1562}, "location_type": "ROOFTOP"}
            }]
        }));
    });

    let client = GooglePlacesClient::new(&server.base_url(), Some("maps-key"), "UY");
    let hit = client.geocode("Charrua 2515, Montevideo").await.unwrap();

    geocode.assert();
    assert_eq!(hit.lat, -34.9087);
    assert_eq!(hit.accuracy, 15.0);
}

#[tokio::test]
async fn test_geocode_without_results() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/geocode/json");
        then.status(200)
            .json_body(json!({"status": "ZERO_RESULTS", "results": []}));
    });

    let client = GooglePlacesClient::new(&server.base_url(), Some("maps-key"), "UY");
    let err = client.geocode("Calle inventada 999").await.unwrap_err();
    assert_eq!(err.user_friendly_message(), "No pudimos encontrar esa direccion.");
}

#[tokio::test]
async fn test_geocode_http_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/geocode/json");
        then.status(500);
    });

    let client = GooglePlacesClient::new(&server.base_url(), Some("maps-key"), "UY");
    let err = client.geocode("Charrua 2515").await.unwrap_err();
    assert_eq!(
        err.user_friendly_message(),
        "Error al consultar la API de Google Maps."
    );
}
