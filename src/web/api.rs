use crate::core::location::{
    accuracy_label, format_relative_time, has_coordinates, safe_return_path, status_message,
    with_coordinates, LocationFix, LocationSource, LocationTracker, Refinement,
};
use crate::core::refresh::{RefreshEngine, RefreshPipeline};
use crate::utils::error::{AppError, Result};
use crate::web::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    #[serde(default)]
    pub last: Option<LocationFix>,
    pub update: LocationFix,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefineResponse {
    #[serde(flatten)]
    pub refinement: Refinement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

fn check_fix(fix: &LocationFix) -> Result<()> {
    let in_range = fix.lat.is_finite()
        && fix.lon.is_finite()
        && (-90.0..=90.0).contains(&fix.lat)
        && (-180.0..=180.0).contains(&fix.lon);
    if in_range {
        Ok(())
    } else {
        Err(AppError::validation("Latitud o longitud fuera de rango permitido."))
    }
}

/// 瀏覽器回報一次定位，回傳是否要換到新座標
pub async fn refine_location(Json(request): Json<RefineRequest>) -> Result<Json<RefineResponse>> {
    check_fix(&request.update)?;

    let path = safe_return_path(request.path.as_deref());
    // 頁面網址沒有座標時，這次定位視為第一次
    let last = match &request.path {
        Some(_) if !has_coordinates(&path) => None,
        _ => request.last.as_ref(),
    };

    let refinement = LocationTracker::observe(last, &request.update);
    let next = refinement
        .apply
        .then(|| with_coordinates(&path, request.update.lat, request.update.lon));

    tracing::debug!(
        "📍 Fix {:.5}, {:.5} (±{:?} m) -> apply={} stop={}",
        request.update.lat,
        request.update.lon,
        request.update.accuracy,
        refinement.apply,
        refinement.stop_watching
    );

    Ok(Json(RefineResponse { refinement, next }))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusParams {
    pub source: Option<LocationSource>,
    pub accuracy: Option<f64>,
    pub elapsed_ms: Option<i64>,
    #[serde(default)]
    pub has_coordinates: bool,
}

#[derive(Debug, Serialize)]
pub struct LocationStatus {
    pub status: &'static str,
    pub accuracy_label: String,
    pub updated_label: Option<String>,
}

pub async fn location_status(Query(params): Query<StatusParams>) -> Json<LocationStatus> {
    Json(LocationStatus {
        status: status_message(params.source, params.has_coordinates),
        accuracy_label: accuracy_label(params.source, params.accuracy),
        updated_label: params.elapsed_ms.map(|ms| format_relative_time(ms.max(0))),
    })
}

const MISSING_SERVICE_KEY: &str = "Supabase URL or service key is not configured.";

fn refresh_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

pub async fn update_branch_details(State(state): State<AppState>) -> Response {
    if state.config.backend.service_key().is_none() {
        return refresh_error(MISSING_SERVICE_KEY.to_string());
    }

    let pipeline = RefreshPipeline::new(
        state.details.clone(),
        state.places.clone(),
        state.config.refresh.max_age_months,
    );
    let engine = RefreshEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            tracing::info!(
                "✅ Branch details refresh: {} results, {} failures",
                report.results().len(),
                report.failures()
            );
            Json(report).into_response()
        }
        Err(AppError::MissingConfigError { field }) => {
            tracing::error!("❌ Refresh aborted, missing {}", field);
            refresh_error("Google Maps API key is not configured.".to_string())
        }
        Err(e) => {
            tracing::error!("❌ Refresh failed: {}", e);
            refresh_error(format!("Error fetching branches: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_fix_navigates_with_coordinates() {
        let request = RefineRequest {
            last: None,
            update: LocationFix {
                lat: -34.9,
                lon: -56.16,
                accuracy: Some(80.0),
            },
            path: Some("/mapa?query=cafe".to_string()),
        };

        let Json(response) = refine_location(Json(request)).await.unwrap();
        assert!(response.refinement.apply);
        assert!(!response.refinement.replace);
        assert_eq!(response.next.as_deref(), Some("/mapa?query=cafe&lat=-34.9&lon=-56.16"));
    }

    #[tokio::test]
    async fn test_out_of_range_fix_is_rejected() {
        let request = RefineRequest {
            last: None,
            update: LocationFix {
                lat: 120.0,
                lon: 0.0,
                accuracy: None,
            },
            path: None,
        };
        let err = refine_location(Json(request)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_status_labels() {
        let Json(status) = location_status(Query(StatusParams {
            source: Some(LocationSource::Gps),
            accuracy: Some(12.0),
            elapsed_ms: Some(125_000),
            has_coordinates: true,
        }))
        .await;

        assert_eq!(status.status, "Ubicacion detectada");
        assert_eq!(status.accuracy_label, "Precision +/- 15 m");
        assert_eq!(status.updated_label.as_deref(), Some("hace 2 min"));
    }

    #[tokio::test]
    async fn test_denied_status_asks_for_permission() {
        let Json(status) = location_status(Query(StatusParams {
            source: Some(LocationSource::Denied),
            accuracy: Some(40.0),
            elapsed_ms: None,
            has_coordinates: false,
        }))
        .await;

        assert_eq!(status.status, "Permiso de ubicacion denegado");
        assert_eq!(
            status.accuracy_label,
            "Habilita los permisos de ubicacion en tu navegador."
        );
    }

    #[tokio::test]
    async fn test_page_without_coordinates_applies_repeated_fix() {
        let fix = LocationFix {
            lat: -34.9,
            lon: -56.16,
            accuracy: Some(80.0),
        };
        let request = RefineRequest {
            last: Some(fix),
            update: fix,
            path: Some("/?query=cafe".to_string()),
        };

        let Json(response) = refine_location(Json(request)).await.unwrap();
        assert!(response.refinement.apply);
        assert!(!response.refinement.replace);
        assert_eq!(response.next.as_deref(), Some("/?query=cafe&lat=-34.9&lon=-56.16"));
    }

    #[tokio::test]
    async fn test_same_fix_on_located_page_is_ignored() {
        let fix = LocationFix {
            lat: -34.9,
            lon: -56.16,
            accuracy: Some(80.0),
        };
        let request = RefineRequest {
            last: Some(fix),
            update: fix,
            path: Some("/?lat=-34.9&lon=-56.16".to_string()),
        };

        let Json(response) = refine_location(Json(request)).await.unwrap();
        assert!(!response.refinement.apply);
        assert!(response.next.is_none());
    }
}
