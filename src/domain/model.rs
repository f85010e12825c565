use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub card_issuer: String,
    #[serde(default)]
    pub card_type: Option<String>,
    #[serde(default)]
    pub card_tier: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    #[serde(default)]
    pub store_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub google_place_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningPeriodPoint {
    pub day: u8,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningPeriod {
    pub open: OpeningPeriodPoint,
    #[serde(default)]
    pub close: Option<OpeningPeriodPoint>,
}

/// 與 Google Places `opening_hours` 相同的結構，原樣快取在 branch_details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periods: Option<Vec<OpeningPeriod>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday_text: Option<Vec<String>>,
    /// 其他欄位 (例如 special_days) 原樣保留
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ratings_total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<OpeningHours>,
    #[serde(
        default,
        deserialize_with = "flexible_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `search_stores` 回傳的一列：一間分店加上所屬商店與促銷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRow {
    pub store_id: String,
    pub branch_id: String,
    pub store_name: String,
    pub branch_name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub promotions: Vec<Promotion>,
    #[serde(default)]
    pub max_discount_value: Option<f64>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
}

/// 卡片顯示用：每間商店只保留一間代表分店
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSummary {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub promotions: Vec<Promotion>,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailBranch {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "one_or_none")]
    pub branch_details: Option<BranchDetails>,
    #[serde(skip_deserializing)]
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub promotions: Vec<Promotion>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub branches: Vec<DetailBranch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStamp {
    pub id: String,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    #[default]
    Default,
    MaxDiscount,
    Distance,
}

impl SortOption {
    pub fn parse(value: &str) -> Self {
        match value {
            "max_discount" => SortOption::MaxDiscount,
            "distance" => SortOption::Distance,
            _ => SortOption::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Default => "default",
            SortOption::MaxDiscount => "max_discount",
            SortOption::Distance => "distance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOption::Default => "Recomendados",
            SortOption::MaxDiscount => "Mayor descuento",
            SortOption::Distance => "Cercanía",
        }
    }

    pub fn all() -> [SortOption; 3] {
        [
            SortOption::Default,
            SortOption::MaxDiscount,
            SortOption::Distance,
        ]
    }
}

/// `search_stores` 的參數；經緯度各自獨立，缺一個時另一個照樣傳
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchQuery {
    #[serde(rename = "search_term")]
    pub term: String,
    #[serde(rename = "sort_option")]
    pub sort: SortOption,
    pub user_lat: Option<f64>,
    pub user_lon: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// 分店快取刷新的候選：有 place id 的分店與上次更新時間
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceLinkedBranch {
    pub id: String,
    pub google_place_id: String,
    #[serde(default, deserialize_with = "one_or_none")]
    pub branch_details: Option<DetailsStamp>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetailsStamp {
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PlaceLinkedBranch {
    pub fn details_updated_at(&self) -> Option<DateTime<Utc>> {
        self.branch_details.as_ref().and_then(|d| d.updated_at)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreInput {
    pub name: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionInput {
    pub name: String,
    pub card_issuer: String,
    pub value: f64,
    pub card_type: String,
    pub card_tier: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchInput {
    pub store_id: String,
    pub name: String,
    pub address: String,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

// `timestamp without time zone` 欄位沒有時區，視為 UTC
fn flexible_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&raw, format).ok())
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

// 嵌入的一對一關聯可能是 null、物件或單元素陣列
fn one_or_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(
        match Option::<OneOrMany<T>>::deserialize(deserializer)? {
            None => None,
            Some(OneOrMany::Many(values)) => values.into_iter().next(),
            Some(OneOrMany::One(value)) => Some(value),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_option_parse_falls_back_to_default() {
        assert_eq!(SortOption::parse("distance"), SortOption::Distance);
        assert_eq!(SortOption::parse("max_discount"), SortOption::MaxDiscount);
        assert_eq!(SortOption::parse("cheapest"), SortOption::Default);
        assert_eq!(SortOption::parse(""), SortOption::Default);
    }

    #[test]
    fn test_details_row_omits_missing_fields() {
        let row = BranchDetails {
            branch_id: Some("b1".to_string()),
            phone_number: Some("2915 1234".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"branch_id": "b1", "phone_number": "2915 1234"})
        );
    }

    #[test]
    fn test_opening_hours_keeps_unknown_fields() {
        let source = serde_json::json!({
            "open_now": false,
            "weekday_text": ["Monday: Closed"],
            "special_days": [{"date": "2024-12-25", "exceptional_hours": true}]
        });
        let hours: OpeningHours = serde_json::from_value(source.clone()).unwrap();

        assert_eq!(hours.open_now, Some(false));
        assert!(hours.extra.contains_key("special_days"));
        assert_eq!(serde_json::to_value(&hours).unwrap(), source);
    }

    #[test]
    fn test_timestamps_with_and_without_zone() {
        let zoned: DetailsStamp =
            serde_json::from_value(serde_json::json!({"updated_at": "2024-05-20T10:00:00+00:00"}))
                .unwrap();
        let naive: DetailsStamp =
            serde_json::from_value(serde_json::json!({"updated_at": "2024-05-20T10:00:00.123456"}))
                .unwrap();
        let spaced: StoreStamp = serde_json::from_value(
            serde_json::json!({"id": "s1", "updated_at": "2024-05-20 10:00:00"}),
        )
        .unwrap();
        let missing: DetailsStamp =
            serde_json::from_value(serde_json::json!({"updated_at": null})).unwrap();

        let expected = "2024-05-20T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(zoned.updated_at, Some(expected));
        assert_eq!(
            naive.updated_at.map(|t| t.timestamp()),
            Some(expected.timestamp())
        );
        assert_eq!(spaced.updated_at, Some(expected));
        assert_eq!(missing.updated_at, None);
        assert!(serde_json::from_value::<DetailsStamp>(serde_json::json!({"updated_at": "ayer"})).is_err());
    }

    #[test]
    fn test_search_row_with_null_promotions() {
        let row: SearchRow = serde_json::from_value(serde_json::json!({
            "store_id": "s1",
            "branch_id": "b1",
            "store_name": "Café Brasilero",
            "branch_name": "Ciudad Vieja",
            "logo_url": null,
            "promotions": null,
            "max_discount_value": null,
            "distance_km": 1.25,
            "latitude": -34.9066,
            "longitude": -56.2044
        }))
        .unwrap();

        assert!(row.promotions.is_empty());
        assert_eq!(row.distance_km, Some(1.25));
        assert_eq!(row.address, None);
    }

    #[test]
    fn test_branch_details_accepts_object_array_or_null() {
        let as_object: DetailBranch = serde_json::from_value(serde_json::json!({
            "id": "b1", "name": "Centro", "address": "18 de Julio 1234",
            "latitude": -34.905, "longitude": -56.19,
            "branch_details": {"rating": 4.5, "user_ratings_total": 120, "phone_number": "2900 0000", "opening_hours": null}
        }))
        .unwrap();
        assert_eq!(as_object.branch_details.unwrap().rating, Some(4.5));

        let as_array: DetailBranch = serde_json::from_value(serde_json::json!({
            "id": "b2", "name": "Pocitos",
            "branch_details": [{"rating": 3.9, "user_ratings_total": 10, "phone_number": null, "opening_hours": {"open_now": true}}]
        }))
        .unwrap();
        let details = as_array.branch_details.unwrap();
        assert_eq!(details.rating, Some(3.9));
        assert_eq!(details.opening_hours.unwrap().open_now, Some(true));

        let as_null: DetailBranch = serde_json::from_value(serde_json::json!({
            "id": "b3", "name": "Carrasco", "branch_details": null
        }))
        .unwrap();
        assert!(as_null.branch_details.is_none());

        let as_empty: DetailBranch = serde_json::from_value(serde_json::json!({
            "id": "b4", "name": "Malvín", "branch_details": []
        }))
        .unwrap();
        assert!(as_empty.branch_details.is_none());
    }
}
