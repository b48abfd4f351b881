//! View state for Skycast: the home and search screens, the async weather
//! service behind them, and plain-text rendering.

pub mod app_services;
pub mod error_mapping;
pub mod models;
pub mod render;
pub mod services;

pub use app_services::AppServices;
pub use models::{HomeModel, SearchModel};
