use chrono::{TimeZone, Utc};
use descuentos_uy::core::refresh::{write_report, RefreshStatus};
use descuentos_uy::{
    GooglePlacesClient, LocalStorage, PostgrestClient, RefreshEngine, RefreshPipeline,
};
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_end_to_end_refresh_with_real_http() {
    let temp_dir = TempDir::new().unwrap();
    let backend = MockServer::start();
    let google = MockServer::start();

    let branches = backend.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/branches")
            .query_param("google_place_id", "not.is.null");
        then.status(200).json_body(json!([
            {"id": "fresh", "google_place_id": "place-fresh", "branch_details": [{"updated_at": "2024-05-20T10:00:00Z"}]},
            {"id": "stale", "google_place_id": "place-stale", "branch_details": {"updated_at": "2023-01-01T00:00:00Z"}},
            {"id": "missing", "google_place_id": "place-missing", "branch_details": null}
        ]));
    });

    let stale_details = google.mock(|when, then| {
        when.method(GET)
            .path("/place/details/json")
            .query_param("place_id", "place-stale");
        then.status(200).json_body(json!({
            "status": "OK",
            "result": {
                "formatted_phone_number": "2600 1234",
                "rating": 4.7,
                "user_ratings_total": 95,
                "geometry": {"location": {"lat": -34.911, "lng": -56.15}}
            }
        }));
    });
    let missing_details = google.mock(|when, then| {
        when.method(GET)
            .path("/place/details/json")
            .query_param("place_id", "place-missing");
        then.status(200).json_body(json!({"status": "NOT_FOUND"}));
    });
    let fresh_details = google.mock(|when, then| {
        when.method(GET)
            .path("/place/details/json")
            .query_param("place_id", "place-fresh");
        then.status(200).json_body(json!({"status": "OK", "result": {}}));
    });

    let coordinates = backend.mock(|when, then| {
        when.method(PATCH)
            .path("/rest/v1/branches")
            .query_param("id", "eq.stale")
            .json_body(json!({"latitude": -34.911, "longitude": -56.15}));
        then.status(204);
    });
    let upsert = backend.mock(|when, then| {
        when.method(POST)
            .path("/rest/v1/branch_details")
            .body_contains("\"branch_id\":\"stale\"")
            .body_contains("\"phone_number\":\"2600 1234\"");
        then.status(201);
    });

    let store = Arc::new(PostgrestClient::new(&backend.base_url(), "anon", "service"));
    let places = Arc::new(GooglePlacesClient::new(&google.base_url(), Some("maps-key"), "UY"));
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let pipeline = RefreshPipeline::new(store, places, 3).with_clock(now);

    let report = RefreshEngine::new_with_monitoring(pipeline, false)
        .run()
        .await
        .unwrap();

    branches.assert();
    stale_details.assert();
    missing_details.assert();
    fresh_details.assert_hits(0);
    coordinates.assert();
    upsert.assert();

    assert_eq!(report.message, "Update process finished.");
    let results = report.results();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].status, RefreshStatus::Skipped);
    assert_eq!(results[1].status, RefreshStatus::CoordinatesAndDetailsUpdated);
    assert_eq!(results[2].status, RefreshStatus::FetchFailed);
    assert_eq!(results[2].error.as_deref(), Some("NOT_FOUND"));

    let storage = LocalStorage::new(temp_dir.path());
    let formats = vec!["json".to_string(), "csv".to_string()];
    let written = write_report(&storage, &report, &formats, now).await.unwrap();
    assert_eq!(
        written,
        vec![
            "branch_details_20240601T120000Z.json".to_string(),
            "branch_details_20240601T120000Z.csv".to_string()
        ]
    );

    let saved: serde_json::Value = serde_json::from_slice(
        &std::fs::read(temp_dir.path().join(&written[0])).unwrap(),
    )
    .unwrap();
    assert_eq!(saved["results"][1]["status"], "Coordinates & Details Updated");
    assert!(saved["results"][0].get("error").is_none());

    let csv = std::fs::read_to_string(temp_dir.path().join(&written[1])).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("branch_id,status,error"));
    assert_eq!(lines.next(), Some("fresh,\"Skipped, recently updated\","));
}

#[tokio::test]
async fn test_refresh_without_branches() {
    let backend = MockServer::start();
    backend.mock(|when, then| {
        when.method(GET).path("/rest/v1/branches");
        then.status(200).json_body(json!([]));
    });

    let store = Arc::new(PostgrestClient::new(&backend.base_url(), "anon", "service"));
    let places = Arc::new(GooglePlacesClient::new(&backend.base_url(), None, "UY"));
    let report = RefreshEngine::new(RefreshPipeline::new(store, places, 3))
        .run()
        .await
        .unwrap();

    assert_eq!(report.message, "No branches with google_place_id found.");
    assert!(report.results.is_none());
}
