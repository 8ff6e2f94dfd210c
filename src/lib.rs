// Library crate root
//
// lib.rs is the public API contract of the crate; main.rs consumes it like
// an external caller would.

pub mod agent;
pub mod api;
pub mod auth;
pub mod chain;
pub mod config;
pub mod dashboard;
pub mod database;
pub mod notifications;
pub mod scheduler;

pub use api::{create_router, ApiError, AppState};
pub use config::AppConfig;
pub use notifications::SseHub;
pub use scheduler::{PriceOracle, TriggerJob};
