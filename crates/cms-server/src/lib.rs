// ABOUTME: HTTP server for travel-cms, exposing CRUD routes for every record kind.
// ABOUTME: Uses Axum with a shared RecordService over whichever DocumentStore was configured.

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod routes;

pub use app_state::{AppState, SharedState};
pub use config::{CmsConfig, ConfigError, StoreBackend};
pub use error::ApiError;
pub use routes::create_router;
