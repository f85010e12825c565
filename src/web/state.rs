use crate::adapters::{GooglePlacesClient, PostgrestClient};
use crate::config::AppConfig;
use crate::domain::ports::{BranchDetailsStore, CatalogAdmin, CatalogReader, PlacesProvider};
use crate::utils::error::Result;
use std::sync::Arc;

/// 所有 handler 共用的狀態
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<dyn CatalogReader>,
    pub admin: Arc<dyn CatalogAdmin>,
    pub details: Arc<dyn BranchDetailsStore>,
    pub places: Arc<dyn PlacesProvider>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let backend = Arc::new(PostgrestClient::from_config(&config.backend)?);
        let places = Arc::new(GooglePlacesClient::from_config(&config.places)?);

        if config.places.api_key().is_none() {
            tracing::warn!("⚠️ No places API key configured; geocoding and refresh are unavailable");
        }

        Ok(Self {
            config: Arc::new(config),
            catalog: backend.clone(),
            admin: backend.clone(),
            details: backend,
            places,
        })
    }
}
