//! Admin panel operations: form validation, CRUD with Spanish outcome
//! messages, and store/promotion assignment toggling.

use crate::domain::model::{Branch, BranchInput, Promotion, PromotionInput, Store, StoreInput};
use crate::domain::ports::CatalogAdmin;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::Validate;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub logo_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromotionForm {
    #[serde(default)]
    pub editing_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub card_issuer: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub card_type: String,
    #[serde(default)]
    pub card_tier: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BranchForm {
    #[serde(default)]
    pub editing_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

fn require_name(name: &str, message: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation(message));
    }
    Ok(())
}

impl Validate for StoreForm {
    fn validate(&self) -> Result<()> {
        require_name(&self.name, "El nombre del local es obligatorio.")
    }
}

impl Validate for PromotionForm {
    fn validate(&self) -> Result<()> {
        require_name(&self.name, "El nombre de la promoción es obligatorio.")?;
        self.parsed_value().map(|_| ())
    }
}

impl Validate for BranchForm {
    fn validate(&self) -> Result<()> {
        require_name(&self.name, "El nombre de la sucursal es obligatorio.")
    }
}

impl StoreForm {
    pub fn to_input(&self) -> Result<StoreInput> {
        self.validate()?;
        let logo_url = self.logo_url.trim();
        Ok(StoreInput {
            name: self.name.trim().to_string(),
            logo_url: (!logo_url.is_empty()).then(|| logo_url.to_string()),
        })
    }
}

impl PromotionForm {
    fn parsed_value(&self) -> Result<f64> {
        let value: f64 = self
            .value
            .trim()
            .parse()
            .map_err(|_| AppError::validation("El valor debe ser un número."))?;
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(AppError::validation("El valor debe estar entre 0 y 100."));
        }
        Ok(value)
    }

    pub fn to_input(&self) -> Result<PromotionInput> {
        self.validate()?;
        Ok(PromotionInput {
            name: self.name.trim().to_string(),
            card_issuer: self.card_issuer.trim().to_string(),
            value: self.parsed_value()?,
            card_type: self.card_type.trim().to_string(),
            card_tier: self.card_tier.trim().to_string(),
            description: self.description.trim().to_string(),
        })
    }

    pub fn from_promotion(promotion: &Promotion) -> Self {
        Self {
            editing_id: Some(promotion.id.clone()),
            name: promotion.name.clone(),
            card_issuer: promotion.card_issuer.clone(),
            value: promotion.value.to_string(),
            card_type: promotion.card_type.clone().unwrap_or_default(),
            card_tier: promotion.card_tier.clone().unwrap_or_default(),
            description: promotion.description.clone().unwrap_or_default(),
        }
    }
}

impl BranchForm {
    pub fn to_input(&self, store_id: &str) -> Result<BranchInput> {
        self.validate()?;
        if store_id.trim().is_empty() {
            return Err(AppError::validation("Seleccioná un local primero."));
        }
        Ok(BranchInput {
            store_id: store_id.to_string(),
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
        })
    }
}

/// 後台畫面需要的全部資料
#[derive(Debug, Clone, Default)]
pub struct AdminSnapshot {
    pub stores: Vec<Store>,
    pub promotions: Vec<Promotion>,
    pub selected_store: Option<Store>,
    pub branches: Vec<Branch>,
    pub assigned_promotion_ids: Vec<String>,
}

impl AdminSnapshot {
    pub async fn load(admin: &dyn CatalogAdmin, selected_store_id: Option<&str>) -> Result<Self> {
        let (stores, promotions) = tokio::try_join!(admin.list_stores(), admin.list_promotions())?;

        let selected_store = selected_store_id
            .filter(|id| !id.is_empty())
            .and_then(|id| stores.iter().find(|s| s.id == id).cloned());

        let (branches, assigned_promotion_ids) = match &selected_store {
            Some(store) => tokio::try_join!(
                admin.list_branches(&store.id),
                admin.assigned_promotion_ids(&store.id)
            )?,
            None => (Vec::new(), Vec::new()),
        };

        Ok(Self {
            stores,
            promotions,
            selected_store,
            branches,
            assigned_promotion_ids,
        })
    }

    pub fn is_assigned(&self, promotion_id: &str) -> bool {
        self.assigned_promotion_ids.iter().any(|id| id == promotion_id)
    }
}

/// 指定時取消，未指定時加入；回傳更新後的指定清單
pub async fn toggle_promotion(
    admin: &dyn CatalogAdmin,
    store_id: &str,
    promotion_id: &str,
) -> Result<Vec<String>> {
    let assigned = admin.assigned_promotion_ids(store_id).await?;

    if assigned.iter().any(|id| id == promotion_id) {
        tracing::debug!("Unassigning promotion {} from store {}", promotion_id, store_id);
        admin.unassign_promotion(store_id, promotion_id).await?;
    } else {
        tracing::debug!("Assigning promotion {} to store {}", promotion_id, store_id);
        admin.assign_promotion(store_id, promotion_id).await?;
    }

    admin.assigned_promotion_ids(store_id).await
}

/// 帶 editing_id 時更新，否則新增
pub async fn save_promotion(admin: &dyn CatalogAdmin, form: &PromotionForm) -> Result<String> {
    let input = form.to_input()?;
    match editing_id(&form.editing_id) {
        Some(id) => {
            admin.update_promotion(id, &input).await?;
            Ok("Promoción actualizada.".to_string())
        }
        None => {
            admin.create_promotion(&input).await?;
            Ok("Promoción creada.".to_string())
        }
    }
}

pub async fn create_store(admin: &dyn CatalogAdmin, form: &StoreForm) -> Result<(Store, String)> {
    let input = form.to_input()?;
    let store = admin.create_store(&input).await?;
    let message = format!("Local '{}' creado.", input.name);
    Ok((store, message))
}

pub async fn update_store(
    admin: &dyn CatalogAdmin,
    store_id: &str,
    form: &StoreForm,
) -> Result<(Store, String)> {
    let input = form.to_input()?;
    let store = admin.update_store(store_id, &input).await?;
    let message = format!("Local \"{}\" actualizado.", input.name);
    Ok((store, message))
}

pub async fn save_branch(
    admin: &dyn CatalogAdmin,
    store_id: &str,
    form: &BranchForm,
) -> Result<String> {
    let input = form.to_input(store_id)?;
    match editing_id(&form.editing_id) {
        Some(id) => {
            admin.update_branch(id, &input).await?;
            Ok("Sucursal actualizada.".to_string())
        }
        None => {
            admin.create_branch(&input).await?;
            Ok("Sucursal creada.".to_string())
        }
    }
}

// 隱藏欄位送出空字串時視為新增
fn editing_id(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn error_message(error: &AppError) -> String {
    format!("Error: {}", error.user_friendly_message())
}
