use crate::config::app_config::MapConfig;
use crate::core::catalog::store_href;
use crate::core::search::UserLocation;
use crate::domain::model::{Coordinates, SearchRow};
use serde::Serialize;

pub const USER_MARKER_LABEL: &str = "Tu ubicación";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// 地圖頁面交給前端腳本的資料
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    pub user: Option<MapMarker>,
    pub markers: Vec<MapMarker>,
}

impl MapView {
    pub fn build(
        config: &MapConfig,
        rows: &[SearchRow],
        user: Option<Coordinates>,
        link_location: Option<&UserLocation>,
    ) -> Self {
        let default_center = Coordinates::new(config.default_lat, config.default_lon);

        let user_marker = user.map(|position| MapMarker {
            lat: position.lat,
            lon: position.lon,
            label: USER_MARKER_LABEL.to_string(),
            store_name: None,
            href: None,
        });

        // 沒有定位 (或座標為 0) 的分店不放到地圖上
        let markers = rows
            .iter()
            .filter_map(|row| {
                let position = Coordinates::from_optional(row.latitude, row.longitude)?;
                Some(MapMarker {
                    lat: position.lat,
                    lon: position.lon,
                    label: row.branch_name.clone(),
                    store_name: Some(row.store_name.clone()),
                    href: Some(store_href(&row.store_id, link_location)),
                })
            })
            .collect();

        Self {
            center: user.unwrap_or(default_center),
            zoom: config.zoom,
            tile_url: config.tile_url.clone(),
            attribution: config.attribution.clone(),
            user: user_marker,
            markers,
        }
    }

    pub fn to_json(&self) -> crate::utils::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(store: &str, branch: &str, lat: Option<f64>, lon: Option<f64>) -> SearchRow {
        SearchRow {
            store_id: store.to_string(),
            branch_id: format!("{}-{}", store, branch),
            store_name: format!("Local {}", store),
            branch_name: branch.to_string(),
            logo_url: None,
            promotions: vec![],
            max_discount_value: None,
            distance_km: None,
            latitude: lat,
            longitude: lon,
            address: None,
        }
    }

    #[test]
    fn test_defaults_to_montevideo_without_user() {
        let view = MapView::build(&MapConfig::default(), &[], None, None);
        assert_eq!(view.center, Coordinates::new(-34.9011, -56.1645));
        assert_eq!(view.zoom, 14);
        assert!(view.user.is_none());
        assert!(view.tile_url.contains("openstreetmap"));
    }

    #[test]
    fn test_centers_on_user_and_adds_marker() {
        let user = Coordinates::new(-34.88, -56.07);
        let view = MapView::build(&MapConfig::default(), &[], Some(user), None);
        assert_eq!(view.center, user);
        assert_eq!(view.user.as_ref().unwrap().label, "Tu ubicación");
    }

    #[test]
    fn test_skips_branches_without_coordinates() {
        let rows = vec![
            row("s1", "Pocitos", Some(-34.91), Some(-56.15)),
            row("s1", "Sin ubicar", Some(0.0), Some(0.0)),
            row("s2", "Centro", None, Some(-56.19)),
        ];
        let location = UserLocation {
            lat: "-34.9".to_string(),
            lon: "-56.1".to_string(),
        };
        let view = MapView::build(&MapConfig::default(), &rows, None, Some(&location));

        assert_eq!(view.markers.len(), 1);
        assert_eq!(view.markers[0].label, "Pocitos");
        assert_eq!(
            view.markers[0].href.as_deref(),
            Some("/local/s1?lat=-34.9&lon=-56.1")
        );
    }

    #[test]
    fn test_json_shape() {
        let view = MapView::build(&MapConfig::default(), &[], None, None);
        let json: serde_json::Value = serde_json::from_str(&view.to_json().unwrap()).unwrap();
        assert_eq!(json["center"]["lat"], -34.9011);
        assert!(json["user"].is_null());
        assert_eq!(json["markers"].as_array().unwrap().len(), 0);
    }
}
