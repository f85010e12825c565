use crate::core::catalog::{page_metadata, sort_branches, BranchOrder};
use crate::core::location::{
    manual_marker, resolve_manual_location, safe_return_path, with_coordinates, without_coordinates,
    ManualLocationForm,
};
use crate::core::map::MapView;
use crate::core::search::{HomeView, SearchParams};
use crate::core::sitemap;
use crate::domain::model::Coordinates;
use crate::web::render;
use crate::web::state::AppState;
use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{Datelike, Local, Utc};
use serde::Deserialize;

fn path_and_query(uri: &OriginalUri) -> String {
    uri.0
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}

fn user_coordinates(params: &SearchParams) -> Option<Coordinates> {
    Coordinates::parse(params.lat()?, params.lon()?)
}

pub async fn home(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
    uri: OriginalUri,
) -> Response {
    match state.catalog.search_stores(&params.to_query()).await {
        Ok(rows) => {
            let view = HomeView::compose(&params, &rows);
            tracing::debug!("🔎 {} rows -> {} stores", rows.len(), view.stores.len());
            Html(render::home_page(&view, &params, &path_and_query(&uri))).into_response()
        }
        Err(e) => {
            tracing::error!("❌ Store search failed: {}", e);
            (
                e.status_code(),
                Html(render::home_error(&e.user_friendly_message())),
            )
                .into_response()
        }
    }
}

pub async fn map(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
    uri: OriginalUri,
) -> Response {
    let rows = match state.catalog.search_stores(&params.to_query()).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("❌ Map search failed: {}", e);
            return (
                e.status_code(),
                Html(render::map_error(&e.user_friendly_message())),
            )
                .into_response();
        }
    };

    let view = MapView::build(
        &state.config.map,
        &rows,
        user_coordinates(&params),
        params.user_location().as_ref(),
    );

    match view.to_json() {
        Ok(json) => Html(render::map_page(&json, &params, &path_and_query(&uri))).into_response(),
        Err(e) => (e.status_code(), Html(render::map_error(&e.to_string()))).into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub order: Option<String>,
}

pub async fn store_detail(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    Query(detail): Query<DetailParams>,
    uri: OriginalUri,
) -> Response {
    let store = match state.catalog.store_detail(&store_id).await {
        Ok(Some(store)) => store,
        Ok(None) => {
            tracing::info!("🔍 Store {} not found", store_id);
            return (StatusCode::NOT_FOUND, Html(render::not_found_page())).into_response();
        }
        Err(e) => {
            // 查詢失敗 (例如 id 格式錯誤) 一律當作找不到
            tracing::warn!("⚠️ Failed to load store {}: {}", store_id, e);
            return (StatusCode::NOT_FOUND, Html(render::not_found_page())).into_response();
        }
    };

    let params = SearchParams {
        lat: detail.lat,
        lon: detail.lon,
        ..Default::default()
    };
    let order = BranchOrder::parse(detail.order.as_deref());
    let branches = sort_branches(&store.branches, user_coordinates(&params), order);
    let metadata = page_metadata(Some(&store));

    Html(render::store_page(
        &store,
        &branches,
        &metadata,
        order,
        &params,
        Local::now().weekday(),
        &path_and_query(&uri),
    ))
    .into_response()
}

fn has_input(value: &Option<String>) -> bool {
    value.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false)
}

/// 沒有任何欄位時顯示表單；否則解析後帶座標轉回原頁
pub async fn manual_location(
    State(state): State<AppState>,
    Query(form): Query<ManualLocationForm>,
) -> Response {
    let return_to = safe_return_path(form.return_to.as_deref());

    if form.wants_clear() {
        tracing::debug!("📍 Clearing coordinates for {}", return_to);
        return Redirect::to(&without_coordinates(&return_to)).into_response();
    }

    if !has_input(&form.address) && !has_input(&form.lat) && !has_input(&form.lon) {
        return Html(render::location_page(&form, None)).into_response();
    }

    match resolve_manual_location(&form, state.places.as_ref()).await {
        Ok(fix) => {
            tracing::info!("📍 Manual location set to {}, {}", fix.lat, fix.lon);
            let target = format!(
                "{}{}",
                with_coordinates(&return_to, fix.lat, fix.lon),
                manual_marker(fix.accuracy)
            );
            Redirect::to(&target).into_response()
        }
        Err(e) => {
            tracing::warn!("⚠️ Manual location rejected: {}", e);
            (
                e.status_code(),
                Html(render::location_page(&form, Some(&e.user_friendly_message()))),
            )
                .into_response()
        }
    }
}

pub async fn sitemap_xml(State(state): State<AppState>) -> Response {
    let stores = match state.catalog.sitemap_stores().await {
        Ok(stores) => stores,
        Err(e) => {
            // 只輸出固定頁面
            tracing::warn!("⚠️ Sitemap store listing failed: {}", e);
            Vec::new()
        }
    };

    let entries = sitemap::entries(state.config.public_base_url(), &stores, Utc::now());
    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        sitemap::render_xml(&entries),
    )
        .into_response()
}

pub async fn healthz() -> &'static str {
    "ok"
}
