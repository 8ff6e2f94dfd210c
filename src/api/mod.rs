use std::sync::Arc;

use crate::agent::AgentService;
use crate::auth::AuthService;
use crate::chain::ChainClient;
use crate::database::repositories::{
    ContactRepository, StakeRepository, TaskRepository, TransactionRepository, UserRepository,
};
use crate::notifications::SseHub;

pub mod agent_handlers;
pub mod auth_handlers;
pub mod contact_handlers;
pub mod dashboard_handlers;
pub mod error;
pub mod event_handlers;
pub mod openapi;
pub mod responses;
pub mod routes;
pub mod stake_handlers;
pub mod task_handlers;
pub mod transaction_handlers;

pub use error::ApiError;
pub use openapi::ApiDoc;
pub use routes::create_router;

/// Shared application state injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: Arc<dyn UserRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub stakes: Arc<dyn StakeRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub chain: Arc<dyn ChainClient>,
    pub agent: Arc<AgentService>,
    pub hub: Arc<SseHub>,
}
