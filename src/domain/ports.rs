use crate::domain::model::{
    Branch, BranchDetails, BranchInput, PlaceLinkedBranch, Promotion, PromotionInput, SearchQuery,
    SearchRow, Store, StoreDetail, StoreInput, StoreStamp,
};
use crate::domain::places::{GeocodeHit, PlaceDetailsResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 公開頁面使用的唯讀查詢
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn search_stores(&self, query: &SearchQuery) -> Result<Vec<SearchRow>>;
    async fn store_detail(&self, store_id: &str) -> Result<Option<StoreDetail>>;
    async fn sitemap_stores(&self) -> Result<Vec<StoreStamp>>;
}

/// 後台的增刪改查
#[async_trait]
pub trait CatalogAdmin: Send + Sync {
    async fn list_stores(&self) -> Result<Vec<Store>>;
    async fn list_promotions(&self) -> Result<Vec<Promotion>>;
    async fn list_branches(&self, store_id: &str) -> Result<Vec<Branch>>;
    async fn assigned_promotion_ids(&self, store_id: &str) -> Result<Vec<String>>;

    async fn create_store(&self, input: &StoreInput) -> Result<Store>;
    async fn update_store(&self, store_id: &str, input: &StoreInput) -> Result<Store>;
    async fn delete_store(&self, store_id: &str) -> Result<()>;

    async fn create_promotion(&self, input: &PromotionInput) -> Result<()>;
    async fn update_promotion(&self, promotion_id: &str, input: &PromotionInput) -> Result<()>;
    async fn delete_promotion(&self, promotion_id: &str) -> Result<()>;

    async fn create_branch(&self, input: &BranchInput) -> Result<()>;
    async fn update_branch(&self, branch_id: &str, input: &BranchInput) -> Result<()>;
    async fn delete_branch(&self, branch_id: &str) -> Result<()>;

    async fn assign_promotion(&self, store_id: &str, promotion_id: &str) -> Result<()>;
    async fn unassign_promotion(&self, store_id: &str, promotion_id: &str) -> Result<()>;
}

/// 分店詳細資料快取的讀寫
#[async_trait]
pub trait BranchDetailsStore: Send + Sync {
    async fn place_linked_branches(&self) -> Result<Vec<PlaceLinkedBranch>>;
    async fn update_branch_coordinates(&self, branch_id: &str, lat: f64, lng: f64) -> Result<()>;
    async fn upsert_branch_details(&self, details: &BranchDetails) -> Result<()>;
}

#[async_trait]
pub trait PlacesProvider: Send + Sync {
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetailsResponse>;
    async fn geocode(&self, address: &str) -> Result<GeocodeHit>;

    /// 是否有可用的 API key
    fn has_credentials(&self) -> bool {
        true
    }
}

/// 批次工作的三個階段
#[async_trait]
pub trait Pipeline: Send + Sync {
    type Item: Send;
    type Staged: Send;
    type Output: Send;

    async fn extract(&self) -> Result<Vec<Self::Item>>;
    async fn transform(&self, items: Vec<Self::Item>) -> Result<Self::Staged>;
    async fn load(&self, staged: Self::Staged) -> Result<Self::Output>;
}
