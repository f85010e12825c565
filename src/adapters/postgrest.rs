//! Client for the hosted backend's PostgREST interface (`/rest/v1`).
//!
//! Reads for public pages go out with the anonymous key; admin writes and the
//! branch-details refresh use the service key when one is configured.

use crate::config::app_config::BackendConfig;
use crate::domain::model::{
    Branch, BranchDetails, BranchInput, PlaceLinkedBranch, Promotion, PromotionInput, SearchQuery,
    SearchRow, Store, StoreDetail, StoreInput, StoreStamp,
};
use crate::domain::ports::{BranchDetailsStore, CatalogAdmin, CatalogReader};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const STORE_DETAIL_SELECT: &str = "id,name,logo_url,website,promotions(*),branches(id,name,address,latitude,longitude,branch_details(rating,user_ratings_total,phone_number,opening_hours))";

#[derive(Debug, Clone, Copy)]
enum Role {
    Public,
    Privileged,
}

#[derive(Debug, Clone)]
pub struct PostgrestClient {
    client: Client,
    rest_url: String,
    anon_key: String,
    write_key: String,
}

#[derive(Deserialize)]
struct PostgrestErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct PromotionLink {
    promotion_id: String,
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

impl PostgrestClient {
    pub fn new(base_url: &str, anon_key: &str, write_key: &str) -> Self {
        Self::with_client(Client::new(), base_url, anon_key, write_key)
    }

    fn with_client(client: Client, base_url: &str, anon_key: &str, write_key: &str) -> Self {
        Self {
            client,
            rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
            write_key: write_key.to_string(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.unwrap_or(10)))
            .build()?;
        Ok(Self::with_client(
            client,
            &config.url,
            &config.anon_key,
            config.write_key(),
        ))
    }

    fn request(&self, method: Method, path: &str, role: Role) -> RequestBuilder {
        let key = match role {
            Role::Public => &self.anon_key,
            Role::Privileged => &self.write_key,
        };
        let url = format!("{}/{}", self.rest_url, path);
        tracing::debug!("PostgREST {} {}", method, url);

        self.client
            .request(method, url)
            .header("apikey", key)
            .bearer_auth(key)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<PostgrestErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(body);
        tracing::warn!("⚠️ Backend responded {}: {}", status, message);
        Err(AppError::backend(status.as_u16(), message))
    }

    async fn fetch<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn execute(request: RequestBuilder) -> Result<()> {
        Self::check(request.send().await?).await?;
        Ok(())
    }

    async fn single<T: DeserializeOwned>(request: RequestBuilder, resource: &str) -> Result<T> {
        let mut rows: Vec<T> = Self::fetch(request).await?;
        if rows.is_empty() {
            return Err(AppError::not_found(resource));
        }
        Ok(rows.swap_remove(0))
    }
}

#[async_trait]
impl CatalogReader for PostgrestClient {
    async fn search_stores(&self, query: &SearchQuery) -> Result<Vec<SearchRow>> {
        let request = self
            .request(Method::POST, "rpc/search_stores", Role::Public)
            .json(query);
        let rows: Option<Vec<SearchRow>> = Self::fetch(request).await?;
        Ok(rows.unwrap_or_default())
    }

    async fn store_detail(&self, store_id: &str) -> Result<Option<StoreDetail>> {
        let request = self
            .request(Method::GET, "stores", Role::Public)
            .query(&[("select", STORE_DETAIL_SELECT.to_string()), ("id", eq(store_id))]);
        let rows: Vec<StoreDetail> = Self::fetch(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn sitemap_stores(&self) -> Result<Vec<StoreStamp>> {
        let request = self
            .request(Method::GET, "stores", Role::Public)
            .query(&[("select", "id,updated_at")]);
        Self::fetch(request).await
    }
}

#[async_trait]
impl CatalogAdmin for PostgrestClient {
    async fn list_stores(&self) -> Result<Vec<Store>> {
        let request = self
            .request(Method::GET, "stores", Role::Privileged)
            .query(&[("select", "id,name,logo_url"), ("order", "name.asc")]);
        Self::fetch(request).await
    }

    async fn list_promotions(&self) -> Result<Vec<Promotion>> {
        let request = self
            .request(Method::GET, "promotions", Role::Privileged)
            .query(&[("select", "*"), ("order", "name.asc")]);
        Self::fetch(request).await
    }

    async fn list_branches(&self, store_id: &str) -> Result<Vec<Branch>> {
        let request = self
            .request(Method::GET, "branches", Role::Privileged)
            .query(&[
                ("select", "id,store_id,name,address".to_string()),
                ("store_id", eq(store_id)),
            ]);
        Self::fetch(request).await
    }

    async fn assigned_promotion_ids(&self, store_id: &str) -> Result<Vec<String>> {
        let request = self
            .request(Method::GET, "store_promotions", Role::Privileged)
            .query(&[
                ("select", "promotion_id".to_string()),
                ("store_id", eq(store_id)),
            ]);
        let links: Vec<PromotionLink> = Self::fetch(request).await?;
        Ok(links.into_iter().map(|l| l.promotion_id).collect())
    }

    async fn create_store(&self, input: &StoreInput) -> Result<Store> {
        let request = self
            .request(Method::POST, "stores", Role::Privileged)
            .header("Prefer", "return=representation")
            .json(input);
        Self::single(request, "store").await
    }

    async fn update_store(&self, store_id: &str, input: &StoreInput) -> Result<Store> {
        let request = self
            .request(Method::PATCH, "stores", Role::Privileged)
            .query(&[("id", eq(store_id))])
            .header("Prefer", "return=representation")
            .json(input);
        Self::single(request, "store").await
    }

    async fn delete_store(&self, store_id: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, "stores", Role::Privileged)
            .query(&[("id", eq(store_id))]);
        Self::execute(request).await
    }

    async fn create_promotion(&self, input: &PromotionInput) -> Result<()> {
        let request = self
            .request(Method::POST, "promotions", Role::Privileged)
            .json(input);
        Self::execute(request).await
    }

    async fn update_promotion(&self, promotion_id: &str, input: &PromotionInput) -> Result<()> {
        let request = self
            .request(Method::PATCH, "promotions", Role::Privileged)
            .query(&[("id", eq(promotion_id))])
            .json(input);
        Self::execute(request).await
    }

    async fn delete_promotion(&self, promotion_id: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, "promotions", Role::Privileged)
            .query(&[("id", eq(promotion_id))]);
        Self::execute(request).await
    }

    async fn create_branch(&self, input: &BranchInput) -> Result<()> {
        let request = self
            .request(Method::POST, "branches", Role::Privileged)
            .json(input);
        Self::execute(request).await
    }

    async fn update_branch(&self, branch_id: &str, input: &BranchInput) -> Result<()> {
        let request = self
            .request(Method::PATCH, "branches", Role::Privileged)
            .query(&[("id", eq(branch_id))])
            .json(input);
        Self::execute(request).await
    }

    async fn delete_branch(&self, branch_id: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, "branches", Role::Privileged)
            .query(&[("id", eq(branch_id))]);
        Self::execute(request).await
    }

    async fn assign_promotion(&self, store_id: &str, promotion_id: &str) -> Result<()> {
        let request = self
            .request(Method::POST, "store_promotions", Role::Privileged)
            .json(&serde_json::json!({
                "store_id": store_id,
                "promotion_id": promotion_id,
            }));
        Self::execute(request).await
    }

    async fn unassign_promotion(&self, store_id: &str, promotion_id: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, "store_promotions", Role::Privileged)
            .query(&[("store_id", eq(store_id)), ("promotion_id", eq(promotion_id))]);
        Self::execute(request).await
    }
}

#[async_trait]
impl BranchDetailsStore for PostgrestClient {
    async fn place_linked_branches(&self) -> Result<Vec<PlaceLinkedBranch>> {
        let request = self
            .request(Method::GET, "branches", Role::Privileged)
            .query(&[
                ("select", "id,google_place_id,branch_details(updated_at)"),
                ("google_place_id", "not.is.null"),
            ]);
        Self::fetch(request).await
    }

    async fn update_branch_coordinates(&self, branch_id: &str, lat: f64, lng: f64) -> Result<()> {
        let request = self
            .request(Method::PATCH, "branches", Role::Privileged)
            .query(&[("id", eq(branch_id))])
            .json(&serde_json::json!({ "latitude": lat, "longitude": lng }));
        Self::execute(request).await
    }

    async fn upsert_branch_details(&self, details: &BranchDetails) -> Result<()> {
        let request = self
            .request(Method::POST, "branch_details", Role::Privileged)
            .query(&[("on_conflict", "branch_id")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(details);
        Self::execute(request).await
    }
}
