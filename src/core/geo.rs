use crate::domain::model::Coordinates;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine 大圓距離 (公里)
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

pub fn format_distance(km: f64) -> String {
    format!("Aprox. a {:.1} km", km)
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// 從查詢字串解析；任一值無法解析或超出範圍時回傳 None
    pub fn parse(lat: &str, lon: &str) -> Option<Self> {
        let lat: f64 = lat.trim().parse().ok()?;
        let lon: f64 = lon.trim().parse().ok()?;

        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }

        Some(Self { lat, lon })
    }

    /// 緯度或經度為 0 視為沒有座標 (資料庫裡未定位的分店)
    pub fn from_optional(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        match (lat, lon) {
            (Some(lat), Some(lon)) if lat != 0.0 && lon != 0.0 => Some(Self { lat, lon }),
            _ => None,
        }
    }

    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        distance_km(self.lat, self.lon, other.lat, other.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_coordinates_is_zero() {
        let (lat, lon) = (-34.9011, -56.1645);
        assert_eq!(distance_km(lat, lon, lat, lon), 0.0);
    }

    #[test]
    fn test_plaza_independencia_to_carrasco_airport() {
        let distance = distance_km(-34.9069, -56.1996, -34.8384, -56.0322);
        assert!((distance - 17.1).abs() < 0.05, "got {}", distance);
    }

    #[test]
    fn test_crossing_equator_and_prime_meridian() {
        assert!(distance_km(10.0, 10.0, -10.0, -10.0) > 0.0);
    }

    #[test]
    fn test_format_distance_one_decimal() {
        assert_eq!(format_distance(2.5), "Aprox. a 2.5 km");
        assert_eq!(format_distance(0.04), "Aprox. a 0.0 km");
        assert_eq!(format_distance(12.349), "Aprox. a 12.3 km");
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(
            Coordinates::parse("-34.9", "-56.16"),
            Some(Coordinates::new(-34.9, -56.16))
        );
        assert_eq!(Coordinates::parse("abc", "-56.16"), None);
        assert_eq!(Coordinates::parse("-94.0", "-56.16"), None);
        assert_eq!(Coordinates::parse("NaN", "1"), None);
    }

    #[test]
    fn test_zero_coordinates_are_treated_as_missing() {
        assert_eq!(Coordinates::from_optional(Some(0.0), Some(-56.1)), None);
        assert_eq!(Coordinates::from_optional(None, Some(-56.1)), None);
        assert!(Coordinates::from_optional(Some(-34.9), Some(-56.1)).is_some());
    }
}
