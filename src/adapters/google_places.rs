use crate::config::app_config::PlacesConfig;
use crate::domain::places::{
    GeocodeHit, GeocodeResponse, PlaceDetailsResponse, PLACE_DETAIL_FIELDS,
};
use crate::domain::ports::PlacesProvider;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    country: String,
}

impl GooglePlacesClient {
    pub fn new(base_url: &str, api_key: Option<&str>, country: &str) -> Self {
        Self::with_client(Client::new(), base_url, api_key, country)
    }

    fn with_client(client: Client, base_url: &str, api_key: Option<&str>, country: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
            country: country.to_string(),
        }
    }

    pub fn from_config(config: &PlacesConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.unwrap_or(15)))
            .build()?;
        Ok(Self::with_client(
            client,
            &config.base_url,
            config.api_key(),
            &config.country,
        ))
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::MissingConfigError {
                field: "places.api_key".to_string(),
            })
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesClient {
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetailsResponse> {
        let key = self.api_key()?;
        let url = format!("{}/place/details/json", self.base_url);
        tracing::debug!("Fetching place details for {}", place_id);

        let response = self
            .client
            .get(url)
            .query(&[
                ("place_id", place_id),
                ("fields", PLACE_DETAIL_FIELDS),
                ("key", key),
            ])
            .send()
            .await?;

        Ok(response.json().await?)
    }

    async fn geocode(&self, address: &str) -> Result<GeocodeHit> {
        let key = self.api_key()?;
        let url = format!("{}/geocode/json", self.base_url);
        let components = format!("country:{}", self.country);

        let response = self
            .client
            .get(url)
            .query(&[
                ("address", address),
                ("components", components.as_str()),
                ("key", key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!("⚠️ Geocoding API responded {}", response.status());
            return Err(AppError::GeocodeError {
                message: "Error al consultar la API de Google Maps.".to_string(),
            });
        }

        let payload: GeocodeResponse = response.json().await?;
        if payload.status != "OK" {
            tracing::debug!("Geocoding '{}' returned status {}", address, payload.status);
        }

        match (payload.status.as_str(), payload.results.into_iter().next()) {
            ("OK", Some(first)) => Ok(GeocodeHit::from(first)),
            _ => Err(AppError::GeocodeError {
                message: "No pudimos encontrar esa direccion.".to_string(),
            }),
        }
    }

    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}
