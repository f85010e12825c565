use crate::domain::model::OpeningHours;
use serde::{Deserialize, Serialize};

pub const PLACE_DETAIL_FIELDS: &str =
    "geometry,formatted_phone_number,rating,user_ratings_total,price_level,opening_hours";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
    #[serde(default)]
    pub location_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceDetailsResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<PlaceDetails>,
}

impl PlaceDetailsResponse {
    /// 只有 status 為 OK 且帶有 result 才算成功
    pub fn into_details(self) -> std::result::Result<PlaceDetails, String> {
        match (self.status.as_str(), self.result) {
            ("OK", Some(details)) => Ok(details),
            _ => Err(self.status),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
    #[serde(default)]
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

/// 地址轉座標的結果，accuracy 為估計值 (公尺)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeHit {
    pub lat: f64,
    pub lon: f64,
    pub accuracy: f64,
    pub formatted_address: Option<String>,
}

impl From<GeocodeResult> for GeocodeHit {
    fn from(result: GeocodeResult) -> Self {
        let accuracy = match result.geometry.location_type.as_deref() {
            Some("ROOFTOP") => 15.0,
            _ => 60.0,
        };
        Self {
            lat: result.geometry.location.lat,
            lon: result.geometry.location.lng,
            accuracy,
            formatted_address: result.formatted_address,
        }
    }
}
