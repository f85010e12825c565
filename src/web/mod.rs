// Web layer: axum routes, HTML rendering and shared handler state.

pub mod admin;
pub mod api;
pub mod error;
pub mod pages;
pub mod render;
pub mod server;
pub mod state;

pub use server::{router, start_server};
pub use state::AppState;
