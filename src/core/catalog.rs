use crate::core::search::UserLocation;
use crate::domain::model::{Coordinates, DetailBranch, Promotion, StoreDetail, StoreSummary};
use std::cmp::Ordering;
use url::form_urlencoded;

pub const SITE_NAME: &str = "DescuentosUY";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BranchOrder {
    #[default]
    Distance,
    Rating,
}

impl BranchOrder {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("rating") => BranchOrder::Rating,
            _ => BranchOrder::Distance,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BranchOrder::Distance => "distance",
            BranchOrder::Rating => "rating",
        }
    }
}

fn rating_of(branch: &DetailBranch) -> f64 {
    branch
        .branch_details
        .as_ref()
        .and_then(|d| d.rating)
        .unwrap_or(0.0)
}

/// 計算每間分店與使用者的距離，再依距離或評分排序
pub fn sort_branches(
    branches: &[DetailBranch],
    user: Option<Coordinates>,
    order: BranchOrder,
) -> Vec<DetailBranch> {
    let mut sorted: Vec<DetailBranch> = branches
        .iter()
        .cloned()
        .map(|mut branch| {
            branch.distance_km = match (
                user,
                Coordinates::from_optional(branch.latitude, branch.longitude),
            ) {
                (Some(user), Some(location)) => Some(user.distance_to(&location)),
                _ => None,
            };
            branch
        })
        .collect();

    match order {
        BranchOrder::Distance => sorted.sort_by(|a, b| {
            let a = a.distance_km.unwrap_or(f64::INFINITY);
            let b = b.distance_km.unwrap_or(f64::INFINITY);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }),
        BranchOrder::Rating => sorted.sort_by(|a, b| rating_of(b).total_cmp(&rating_of(a))),
    }

    sorted
}

/// 促銷百分比，整數不帶小數點
pub fn format_percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}%", value as i64)
    } else {
        format!("{}%", value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub og_title: Option<String>,
    pub og_image: Option<String>,
}

pub fn page_metadata(store: Option<&StoreDetail>) -> PageMetadata {
    let Some(store) = store else {
        return PageMetadata {
            title: "Local no encontrado".to_string(),
            description: String::new(),
            og_title: None,
            og_image: None,
        };
    };

    let description = match store.promotions.first() {
        Some(top) => format!("{} de descuento - {}", format_percent(top.value), top.name),
        None => "Descuentos disponibles".to_string(),
    };

    PageMetadata {
        title: format!("{} - Descuentos | {}", store.name, SITE_NAME),
        description,
        og_title: Some(store.name.clone()),
        og_image: store.logo_url.clone(),
    }
}

pub fn tel_href(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    format!("tel:{}", digits)
}

pub fn store_href(store_id: &str, user: Option<&UserLocation>) -> String {
    let path = format!("/local/{}", store_id);
    match user {
        Some(location) => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("lat", &location.lat)
                .append_pair("lon", &location.lon)
                .finish();
            format!("{}?{}", path, query)
        }
        None => path,
    }
}

/// 商店卡片：最高折扣的促銷置頂，其餘列在下方
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCard<'a> {
    pub store: &'a StoreSummary,
    pub top_promotion: Option<&'a Promotion>,
    pub extra_promotions: Vec<&'a Promotion>,
    pub href: String,
}

impl<'a> StoreCard<'a> {
    pub fn new(store: &'a StoreSummary, user: Option<&UserLocation>) -> Self {
        let mut promotions: Vec<&Promotion> = store.promotions.iter().collect();
        promotions.sort_by(|a, b| b.value.total_cmp(&a.value));

        let mut iter = promotions.into_iter();
        let top_promotion = iter.next();
        let extra_promotions = iter.collect();

        Self {
            store,
            top_promotion,
            extra_promotions,
            href: store_href(&store.id, user),
        }
    }

    pub fn extra_label(&self) -> Option<String> {
        match self.extra_promotions.len() {
            0 => None,
            1 => Some("+1 promoción más".to_string()),
            n => Some(format!("+{} promociones más", n)),
        }
    }
}
