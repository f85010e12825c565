//! Server half of the geolocation flow.
//!
//! The browser reports each fix it gets from the geolocation API; the tracker
//! decides whether the fix is worth navigating to (and whether the browser
//! can stop watching), and the URL helpers put the coordinates in the query
//! string the pages read.

use crate::domain::ports::PlacesProvider;
use crate::utils::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// 約略的每度公尺數
const METERS_PER_DEGREE: f64 = 111_139.0;
const MIN_ACCURACY_GAIN_M: f64 = 10.0;
const MIN_MOVE_M: f64 = 20.0;
const GOOD_ENOUGH_ACCURACY_M: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Refinement {
    /// navigate to the new coordinates
    pub apply: bool,
    /// replace the history entry instead of pushing
    pub replace: bool,
    pub stop_watching: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocationTracker;

impl LocationTracker {
    pub fn planar_distance_m(a: &LocationFix, b: &LocationFix) -> f64 {
        let d_lat = b.lat - a.lat;
        let d_lon = b.lon - a.lon;
        (d_lat * d_lat + d_lon * d_lon).sqrt() * METERS_PER_DEGREE
    }

    pub fn observe(last: Option<&LocationFix>, update: &LocationFix) -> Refinement {
        let Some(last) = last else {
            // 第一次定位一定套用，並以 push 加入瀏覽紀錄
            return Refinement {
                apply: true,
                replace: false,
                stop_watching: false,
            };
        };

        let improved_accuracy = match (update.accuracy, last.accuracy) {
            (Some(_), None) => true,
            (Some(new), Some(previous)) => new < previous - MIN_ACCURACY_GAIN_M,
            (None, _) => false,
        };
        let moved = Self::planar_distance_m(last, update) > MIN_MOVE_M;

        if !(improved_accuracy || moved) {
            return Refinement {
                apply: false,
                replace: true,
                stop_watching: false,
            };
        }

        Refinement {
            apply: true,
            replace: true,
            stop_watching: update
                .accuracy
                .map(|a| a <= GOOD_ENOUGH_ACCURACY_M)
                .unwrap_or(false),
        }
    }
}

fn split_path(path_and_query: &str) -> (&str, &str) {
    match path_and_query.split_once('?') {
        Some((path, query)) => (path, query),
        None => (path_and_query, ""),
    }
}

fn rebuild(path: &str, pairs: Vec<(String, String)>) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{}?{}", path, query)
}

/// 設定 (或覆寫) lat/lon，保留其他參數的順序
pub fn with_coordinates(path_and_query: &str, lat: f64, lon: f64) -> String {
    let (path, query) = split_path(path_and_query);
    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    for (key, value) in [("lat", lat.to_string()), ("lon", lon.to_string())] {
        match pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => pairs.push((key.to_string(), value)),
        }
    }

    rebuild(path, pairs)
}

/// 手動位置成功後附在重導網址的 fragment，瀏覽器端據此記錄來源
pub fn manual_marker(accuracy: Option<f64>) -> String {
    match accuracy {
        Some(a) if a.is_finite() => format!("#manual={}", a.round() as i64),
        _ => "#manual".to_string(),
    }
}

/// 網址查詢字串同時帶有 lat 與 lon
pub fn has_coordinates(path_and_query: &str) -> bool {
    let (_, query) = split_path(path_and_query);
    let mut lat = false;
    let mut lon = false;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "lat" => lat = true,
            "lon" => lon = true,
            _ => {}
        }
    }
    lat && lon
}

pub fn without_coordinates(path_and_query: &str) -> String {
    let (path, query) = split_path(path_and_query);
    let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .filter(|(k, _)| k != "lat" && k != "lon")
        .collect();

    rebuild(path, pairs)
}

/// 只接受站內路徑，避免開放式重導
pub fn safe_return_path(candidate: Option<&str>) -> String {
    match candidate {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => "/".to_string(),
    }
}

pub fn format_accuracy(accuracy: Option<f64>) -> String {
    match accuracy {
        None => "Precision aproximada".to_string(),
        Some(a) if a.is_nan() => "Precision aproximada".to_string(),
        Some(a) if a <= 5.0 => "Precision +/- 5 m".to_string(),
        Some(a) if a <= 15.0 => "Precision +/- 15 m".to_string(),
        Some(a) => format!("Precision +/- {} m", a.round() as i64),
    }
}

pub fn format_relative_time(elapsed_ms: i64) -> String {
    if elapsed_ms < 60_000 {
        return "hace unos segundos".to_string();
    }
    if elapsed_ms < 3_600_000 {
        return format!("hace {} min", elapsed_ms / 60_000);
    }
    format!("hace {} h", elapsed_ms / 3_600_000)
}

pub fn clamp_coordinate_input(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Gps,
    Manual,
    Denied,
}

/// 位置狀態列的文字
pub fn status_message(source: Option<LocationSource>, has_coordinates: bool) -> &'static str {
    match source {
        Some(LocationSource::Denied) => "Permiso de ubicacion denegado",
        Some(LocationSource::Manual) => "Ubicacion ajustada manualmente",
        _ if !has_coordinates => "Buscando tu ubicacion",
        _ => "Ubicacion detectada",
    }
}

/// 拒絕授權時改為提示開啟權限
pub fn accuracy_label(source: Option<LocationSource>, accuracy: Option<f64>) -> String {
    match source {
        Some(LocationSource::Denied) => {
            "Habilita los permisos de ubicacion en tu navegador.".to_string()
        }
        _ => format_accuracy(accuracy),
    }
}

/// `/ubicacion` 表單：地址或座標，`clear` 代表重新定位
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManualLocationForm {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lon: Option<String>,
    #[serde(default)]
    pub return_to: Option<String>,
    #[serde(default)]
    pub clear: Option<String>,
}

impl ManualLocationForm {
    pub fn wants_clear(&self) -> bool {
        self.clear.as_deref().map(|v| !v.is_empty()).unwrap_or(false)
    }

    fn typed_coordinates(&self) -> Option<(String, String)> {
        let lat = clamp_coordinate_input(self.lat.as_deref().unwrap_or_default());
        let lon = clamp_coordinate_input(self.lon.as_deref().unwrap_or_default());
        (!lat.is_empty() && !lon.is_empty()).then_some((lat, lon))
    }
}

/// 座標優先；沒有座標時用地址做地理編碼
pub async fn resolve_manual_location(
    form: &ManualLocationForm,
    places: &dyn PlacesProvider,
) -> Result<LocationFix> {
    if let Some((lat, lon)) = form.typed_coordinates() {
        let (Ok(lat), Ok(lon)) = (lat.parse::<f64>(), lon.parse::<f64>()) else {
            return Err(AppError::validation("Latitud o longitud con formato invalido."));
        };
        if !lat.is_finite() || !lon.is_finite() {
            return Err(AppError::validation("Latitud o longitud con formato invalido."));
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(AppError::validation("Latitud o longitud fuera de rango permitido."));
        }
        return Ok(LocationFix {
            lat,
            lon,
            accuracy: None,
        });
    }

    let address = form.address.as_deref().map(str::trim).unwrap_or_default();
    if address.is_empty() {
        return Err(AppError::validation(
            "Escribe una direccion (ej: Charrua 2515, Montevideo).",
        ));
    }

    let hit = places.geocode(address).await?;
    tracing::debug!(
        "Geocoded '{}' to {:?}",
        address,
        hit.formatted_address.as_deref().unwrap_or("?")
    );
    Ok(LocationFix {
        lat: hit.lat,
        lon: hit.lon,
        accuracy: Some(hit.accuracy),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::places::{GeocodeHit, PlaceDetailsResponse};
    use async_trait::async_trait;

    struct StubPlaces;

    #[async_trait]
    impl PlacesProvider for StubPlaces {
        async fn place_details(&self, _place_id: &str) -> Result<PlaceDetailsResponse> {
            Err(AppError::not_found("place"))
        }

        async fn geocode(&self, address: &str) -> Result<GeocodeHit> {
            if address.starts_with("Charrua") {
                Ok(GeocodeHit {
                    lat: -34.8966,
                    lon: -56.1511,
                    accuracy: 15.0,
                    formatted_address: Some("Charrúa 2515, Montevideo".to_string()),
                })
            } else {
                Err(AppError::GeocodeError {
                    message: "No pudimos encontrar esa direccion.".to_string(),
                })
            }
        }
    }

    #[test]
    fn test_accuracy_label_when_denied() {
        assert_eq!(
            accuracy_label(Some(LocationSource::Denied), Some(12.0)),
            "Habilita los permisos de ubicacion en tu navegador."
        );
        assert_eq!(accuracy_label(Some(LocationSource::Gps), Some(12.0)), "Precision +/- 15 m");
        assert_eq!(accuracy_label(None, None), "Precision aproximada");
    }

    #[test]
    fn test_manual_marker() {
        assert_eq!(manual_marker(Some(15.0)), "#manual=15");
        assert_eq!(manual_marker(None), "#manual");
    }

    #[test]
    fn test_has_coordinates() {
        assert!(has_coordinates("/?query=cafe&lat=-34.9&lon=-56.16"));
        assert!(!has_coordinates("/?query=cafe"));
        assert!(!has_coordinates("/mapa?lat=-34.9"));
        assert!(!has_coordinates("/?lat=&lon="));
        assert!(!has_coordinates("/"));
    }

    fn manual(address: Option<&str>, lat: Option<&str>, lon: Option<&str>) -> ManualLocationForm {
        ManualLocationForm {
            address: address.map(str::to_string),
            lat: lat.map(str::to_string),
            lon: lon.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_manual_coordinates_win_over_address() {
        let fix = resolve_manual_location(&manual(Some("Charrua 2515"), Some("-34.90"), Some("-56.16")), &StubPlaces)
            .await
            .unwrap();
        assert_eq!((fix.lat, fix.lon, fix.accuracy), (-34.90, -56.16, None));
    }

    #[tokio::test]
    async fn test_manual_coordinates_validation() {
        let err = resolve_manual_location(&manual(None, Some("-94"), Some("-56")), &StubPlaces)
            .await
            .unwrap_err();
        assert_eq!(err.user_friendly_message(), "Latitud o longitud fuera de rango permitido.");

        let err = resolve_manual_location(&manual(None, Some("-3-4"), Some("-56")), &StubPlaces)
            .await
            .unwrap_err();
        assert_eq!(err.user_friendly_message(), "Latitud o longitud con formato invalido.");
    }

    #[tokio::test]
    async fn test_manual_address_is_geocoded() {
        let fix = resolve_manual_location(&manual(Some(" Charrua 2515, Montevideo "), None, None), &StubPlaces)
            .await
            .unwrap();
        assert_eq!(fix.accuracy, Some(15.0));

        let err = resolve_manual_location(&manual(Some("   "), None, Some("-56")), &StubPlaces)
            .await
            .unwrap_err();
        assert_eq!(
            err.user_friendly_message(),
            "Escribe una direccion (ej: Charrua 2515, Montevideo)."
        );

        let err = resolve_manual_location(&manual(Some("Nowhere"), None, None), &StubPlaces)
            .await
            .unwrap_err();
        assert_eq!(err.user_friendly_message(), "No pudimos encontrar esa direccion.");
    }

    #[test]
    fn test_status_message() {
        assert_eq!(status_message(Some(LocationSource::Denied), true), "Permiso de ubicacion denegado");
        assert_eq!(status_message(Some(LocationSource::Manual), false), "Ubicacion ajustada manualmente");
        assert_eq!(status_message(None, false), "Buscando tu ubicacion");
        assert_eq!(status_message(Some(LocationSource::Gps), true), "Ubicacion detectada");
    }

    fn fix(lat: f64, lon: f64, accuracy: Option<f64>) -> LocationFix {
        LocationFix { lat, lon, accuracy }
    }

    #[test]
    fn test_first_fix_is_pushed() {
        let r = LocationTracker::observe(None, &fix(-34.9, -56.16, Some(120.0)));
        assert!(r.apply);
        assert!(!r.replace);
        assert!(!r.stop_watching);
    }

    #[test]
    fn test_small_accuracy_gain_and_no_move_is_ignored() {
        let last = fix(-34.9, -56.16, Some(50.0));
        let r = LocationTracker::observe(Some(&last), &fix(-34.9, -56.16, Some(45.0)));
        assert!(!r.apply);
    }

    #[test]
    fn test_accuracy_gain_over_ten_meters_applies() {
        let last = fix(-34.9, -56.16, Some(80.0));
        let r = LocationTracker::observe(Some(&last), &fix(-34.9, -56.16, Some(60.0)));
        assert!(r.apply);
        assert!(r.replace);
        assert!(!r.stop_watching);
    }

    #[test]
    fn test_unknown_previous_accuracy_applies() {
        let last = fix(-34.9, -56.16, None);
        let r = LocationTracker::observe(Some(&last), &fix(-34.9, -56.16, Some(100.0)));
        assert!(r.apply);
    }

    #[test]
    fn test_movement_over_twenty_meters_applies() {
        let last = fix(-34.9, -56.16, Some(40.0));
        // 0.0003° ≈ 33 m
        let r = LocationTracker::observe(Some(&last), &fix(-34.9003, -56.16, Some(40.0)));
        assert!(r.apply);
    }

    #[test]
    fn test_precise_fix_stops_watching() {
        let last = fix(-34.9, -56.16, Some(65.0));
        let r = LocationTracker::observe(Some(&last), &fix(-34.9, -56.16, Some(25.0)));
        assert!(r.apply);
        assert!(r.stop_watching);
    }

    #[test]
    fn test_with_coordinates_keeps_other_params() {
        assert_eq!(
            with_coordinates("/mapa?query=cafe&lat=1&sort=distance", -34.9, -56.16),
            "/mapa?query=cafe&lat=-34.9&sort=distance&lon=-56.16"
        );
        assert_eq!(with_coordinates("/", -34.9, -56.16), "/?lat=-34.9&lon=-56.16");
    }

    #[test]
    fn test_without_coordinates() {
        assert_eq!(without_coordinates("/?query=cafe&lat=1&lon=2"), "/?query=cafe");
        assert_eq!(without_coordinates("/mapa?lat=1&lon=2"), "/mapa");
    }

    #[test]
    fn test_safe_return_path() {
        assert_eq!(safe_return_path(Some("/mapa?query=x")), "/mapa?query=x");
        assert_eq!(safe_return_path(Some("https://evil.example")), "/");
        assert_eq!(safe_return_path(Some("//evil.example")), "/");
        assert_eq!(safe_return_path(None), "/");
    }

    #[test]
    fn test_format_accuracy() {
        assert_eq!(format_accuracy(None), "Precision aproximada");
        assert_eq!(format_accuracy(Some(f64::NAN)), "Precision aproximada");
        assert_eq!(format_accuracy(Some(4.0)), "Precision +/- 5 m");
        assert_eq!(format_accuracy(Some(15.0)), "Precision +/- 15 m");
        assert_eq!(format_accuracy(Some(42.6)), "Precision +/- 43 m");
    }

    #[test]
    fn test_format_relative_time() {
        assert_eq!(format_relative_time(12_000), "hace unos segundos");
        assert_eq!(format_relative_time(5 * 60_000 + 10), "hace 5 min");
        assert_eq!(format_relative_time(2 * 3_600_000 + 1), "hace 2 h");
    }

    #[test]
    fn test_clamp_coordinate_input() {
        assert_eq!(clamp_coordinate_input(" -34,90a1 "), "-34901");
        assert_eq!(clamp_coordinate_input("+56.16"), "+56.16");
    }
}
