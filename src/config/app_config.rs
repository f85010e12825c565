use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_coordinates, validate_directory, validate_http_url, validate_non_blank,
    validate_one_of, validate_range, validate_secret, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub places: PlacesConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default)]
    pub log_json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub service_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_places_base_url")]
    pub base_url: String,
    #[serde(default = "default_country")]
    pub country: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_map_lat")]
    pub default_lat: f64,
    #[serde(default = "default_map_lon")]
    pub default_lon: f64,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_max_age_months")]
    pub max_age_months: u32,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<String>,
    #[serde(default)]
    pub monitor: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub enabled: bool,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_public_base_url() -> String {
    "https://descuentosuy.vercel.app".to_string()
}

fn default_places_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_country() -> String {
    "UY".to_string()
}

// Montevideo
fn default_map_lat() -> f64 {
    -34.9011
}

fn default_map_lon() -> f64 {
    -56.1645
}

fn default_zoom() -> u8 {
    14
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_attribution() -> String {
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
        .to_string()
}

fn default_max_age_months() -> u32 {
    3
}

fn default_output_path() -> String {
    "./reports".to_string()
}

fn default_output_formats() -> Vec<String> {
    vec!["json".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_base_url: default_public_base_url(),
            log_json: false,
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_places_base_url(),
            country: default_country(),
            timeout_seconds: None,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_lat: default_map_lat(),
            default_lon: default_map_lon(),
            zoom: default_zoom(),
            tile_url: default_tile_url(),
            attribution: default_attribution(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            max_age_months: default_max_age_months(),
            output_path: default_output_path(),
            output_formats: default_output_formats(),
            monitor: false,
        }
    }
}

/// 未設定的 `${VAR}` 會原樣留下，視同沒有值
fn resolved(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.starts_with("${"))
}

impl BackendConfig {
    pub fn service_key(&self) -> Option<&str> {
        resolved(&self.service_key)
    }

    /// 寫入用的金鑰，沒有 service key 時退回 anon key
    pub fn write_key(&self) -> &str {
        self.service_key().unwrap_or(&self.anon_key)
    }
}

impl PlacesConfig {
    pub fn api_key(&self) -> Option<&str> {
        resolved(&self.api_key)
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_ANON_KEY})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Option<Regex>> = OnceLock::new();
        let Some(re) = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([A-Za-z0-9_]+)\}").ok()) else {
            return content.to_string();
        };

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn public_base_url(&self) -> &str {
        self.server.public_base_url.trim_end_matches('/')
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_http_url("server.public_base_url", &self.server.public_base_url)?;

        validate_http_url("backend.url", &self.backend.url)?;
        validate_secret("backend.anon_key", &self.backend.anon_key)?;

        validate_http_url("places.base_url", &self.places.base_url)?;
        validate_non_blank("places.country", &self.places.country)?;

        validate_coordinates("map.default", self.map.default_lat, self.map.default_lon)?;
        validate_range("map.zoom", self.map.zoom, 1, 19)?;

        validate_range("refresh.max_age_months", self.refresh.max_age_months, 1, 120)?;
        validate_directory("refresh.output_path", &self.refresh.output_path)?;
        validate_one_of("refresh.output_formats", &self.refresh.output_formats, &["json", "csv"])?;

        Ok(())
    }
}
