use crate::config::AppConfig;
use crate::utils::error::Result;
use crate::web::state::AppState;
use crate::web::{admin, api, pages};
use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let mut app = Router::new()
        .route("/", get(pages::home))
        .route("/mapa", get(pages::map))
        .route("/local/:id", get(pages::store_detail))
        .route("/ubicacion", get(pages::manual_location))
        .route("/sitemap.xml", get(pages::sitemap_xml))
        .route("/healthz", get(pages::healthz))
        .route("/api/location/refine", post(api::refine_location))
        .route("/api/location/status", get(api::location_status))
        .route("/api/update-branch-details", get(api::update_branch_details));

    if state.config.admin.enabled {
        app = app.merge(admin::routes());
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: AppConfig) -> Result<()> {
    let bind = config.server.bind.clone();
    let admin_enabled = config.admin.enabled;

    tracing::info!("🔧 Initializing state...");
    let state = AppState::from_config(config)?;
    let app = router(state);

    if admin_enabled {
        tracing::warn!("⚠️ Admin panel is mounted at /admin without authentication");
    }

    let listener = TcpListener::bind(&bind).await?;
    tracing::info!("🚀 Server running on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("❌ Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("❌ Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
