//! Composition of the `search_stores` result into the views the pages render.
//!
//! The remote procedure returns one row per branch. The home page shows one
//! card per store (the closest branch wins), a "top discounts" strip and a
//! "nearby" strip; the map page uses the raw rows.

use crate::domain::model::{Promotion, SearchQuery, SearchRow, SortOption, StoreSummary};
use serde::Deserialize;
use std::collections::HashMap;
use url::form_urlencoded;

pub const HIGHLIGHT_LIMIT: usize = 6;

/// 頁面查詢字串：`query`, `sort`, `lat`, `lon`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub sort: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

/// 使用者位置 (保留查詢字串中的原始文字，用於連結)
#[derive(Debug, Clone, PartialEq)]
pub struct UserLocation {
    pub lat: String,
    pub lon: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_float(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

impl SearchParams {
    pub fn query(&self) -> Option<&str> {
        non_empty(&self.query)
    }

    pub fn sort(&self) -> Option<&str> {
        non_empty(&self.sort)
    }

    pub fn lat(&self) -> Option<&str> {
        non_empty(&self.lat)
    }

    pub fn lon(&self) -> Option<&str> {
        non_empty(&self.lon)
    }

    pub fn sort_option(&self) -> SortOption {
        self.sort().map(SortOption::parse).unwrap_or_default()
    }

    pub fn to_query(&self) -> SearchQuery {
        SearchQuery {
            term: self.query().unwrap_or_default().to_string(),
            sort: self.sort_option(),
            user_lat: parse_float(self.lat()),
            user_lon: parse_float(self.lon()),
        }
    }

    /// 任一座標存在即視為有位置
    pub fn user_location(&self) -> Option<UserLocation> {
        if self.lat().is_none() && self.lon().is_none() {
            return None;
        }
        Some(UserLocation {
            lat: self.lat().unwrap_or_default().to_string(),
            lon: self.lon().unwrap_or_default().to_string(),
        })
    }

    pub fn has_coordinates(&self) -> bool {
        self.lat().is_some() && self.lon().is_some()
    }

    /// 帶著目前的搜尋條件連到另一頁
    pub fn carry_to(&self, path: &str, empty_suffix: &str) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        for (key, value) in [
            ("query", self.query()),
            ("sort", self.sort()),
            ("lat", self.lat()),
            ("lon", self.lon()),
        ] {
            if let Some(value) = value {
                serializer.append_pair(key, value);
                any = true;
            }
        }

        if any {
            format!("{}?{}", path, serializer.finish())
        } else {
            format!("{}{}", path, empty_suffix)
        }
    }

    pub fn map_href(&self) -> String {
        self.carry_to("/mapa", "")
    }

    pub fn list_href(&self) -> String {
        self.carry_to("/", "?")
    }
}

pub fn max_promotion_value(promotions: &[Promotion]) -> f64 {
    promotions
        .iter()
        .map(|p| p.value)
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max)
}

fn summary_from(row: &SearchRow) -> StoreSummary {
    StoreSummary {
        id: row.store_id.clone(),
        branch_id: row.branch_id.clone(),
        name: row.store_name.clone(),
        logo_url: row.logo_url.clone(),
        promotions: row.promotions.clone(),
        distance_km: row.distance_km,
    }
}

/// 每間商店保留一列；有距離的分店優先，距離較近者取代
pub fn dedupe_by_store(rows: &[SearchRow]) -> Vec<StoreSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut kept: HashMap<String, StoreSummary> = HashMap::new();

    for row in rows {
        match kept.get(&row.store_id) {
            None => {
                order.push(row.store_id.clone());
                kept.insert(row.store_id.clone(), summary_from(row));
            }
            Some(existing) => {
                let replace = match (row.distance_km, existing.distance_km) {
                    (Some(_), None) => true,
                    (Some(candidate), Some(current)) => candidate < current,
                    _ => false,
                };
                if replace {
                    kept.insert(row.store_id.clone(), summary_from(row));
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|id| kept.remove(&id))
        .collect()
}

pub fn top_discounts(stores: &[StoreSummary], limit: usize) -> Vec<StoreSummary> {
    let mut scored: Vec<(f64, &StoreSummary)> = stores
        .iter()
        .map(|s| (max_promotion_value(&s.promotions), s))
        .filter(|(score, _)| *score > 0.0)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, store)| store.clone())
        .collect()
}

pub fn nearby(stores: &[StoreSummary], limit: usize) -> Vec<StoreSummary> {
    let mut with_distance: Vec<(f64, &StoreSummary)> = stores
        .iter()
        .filter_map(|s| s.distance_km.map(|d| (d, s)))
        .collect();

    with_distance.sort_by(|a, b| a.0.total_cmp(&b.0));
    with_distance
        .into_iter()
        .take(limit)
        .map(|(_, store)| store.clone())
        .collect()
}

#[derive(Debug, Clone)]
pub struct HomeView {
    pub stores: Vec<StoreSummary>,
    pub top_discounts: Vec<StoreSummary>,
    pub nearby: Vec<StoreSummary>,
    pub map_href: String,
    pub user_location: Option<UserLocation>,
}

impl HomeView {
    pub fn compose(params: &SearchParams, rows: &[SearchRow]) -> Self {
        let stores = dedupe_by_store(rows);
        let top_discounts = top_discounts(&stores, HIGHLIGHT_LIMIT);
        let nearby = nearby(&stores, HIGHLIGHT_LIMIT);

        Self {
            stores,
            top_discounts,
            nearby,
            map_href: params.map_href(),
            user_location: params.user_location(),
        }
    }
}
