use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use chrono::Utc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::openapi::ApiDoc;
use super::{
    agent_handlers, auth_handlers, contact_handlers, dashboard_handlers, event_handlers,
    stake_handlers, task_handlers, transaction_handlers, AppState,
};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

/// Create the API router with Swagger UI and the live event stream
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Health endpoint
        .route("/health", get(health_check))
        // Auth endpoints
        .route("/api/auth/signup", post(auth_handlers::signup))
        .route("/api/auth/signin", post(auth_handlers::signin))
        .route("/api/auth/me", get(auth_handlers::me))
        // Contact endpoints
        .route("/api/contacts", post(contact_handlers::create_contact))
        .route("/api/contacts", get(contact_handlers::list_contacts))
        .route("/api/contacts/search", get(contact_handlers::search_contacts))
        .route("/api/contacts/:id", delete(contact_handlers::delete_contact))
        // Transaction endpoints
        .route("/api/transactions", post(transaction_handlers::create_transaction))
        .route("/api/transactions", get(transaction_handlers::list_transactions))
        // Stake endpoints
        .route("/api/stakes", post(stake_handlers::create_stake))
        .route("/api/stakes", get(stake_handlers::list_stakes))
        .route("/api/stakes/:pubkey/status", get(stake_handlers::stake_status))
        // Scheduled task endpoints
        .route("/api/tasks", post(task_handlers::create_task))
        .route("/api/tasks", get(task_handlers::list_tasks))
        .route("/api/tasks/:id", delete(task_handlers::cancel_task))
        .route("/api/tasks/:id/dismiss", patch(task_handlers::dismiss_task))
        // Dashboard endpoint
        .route("/api/dashboard", get(dashboard_handlers::get_dashboard))
        // Agent endpoints
        .route("/api/agent/message", post(agent_handlers::post_message))
        .route("/api/agent/history", get(agent_handlers::get_history))
        // Live event stream (SSE)
        .route("/api/events", get(event_handlers::events))
        .with_state(state)
}
