pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;
pub mod web;

pub use adapters::{GooglePlacesClient, LocalStorage, PostgrestClient};
pub use config::AppConfig;
pub use crate::core::{RefreshEngine, RefreshPipeline, RefreshReport};
pub use utils::error::{AppError, Result};
pub use web::{router, start_server, AppState};
