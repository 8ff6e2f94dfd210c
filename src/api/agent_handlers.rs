use axum::extract::State;
use axum::Json;

use crate::agent::AgentReply;
use crate::auth::AuthUser;
use crate::database::models::Message;

use super::error::ApiError;
use super::responses::*;
use super::AppState;

/// Send a natural-language message to the intent agent
///
/// Provider failures are folded into the reply as an `unknown` action; this
/// endpoint only errors when the store itself is unavailable.
#[utoipa::path(
    post,
    path = "/api/agent/message",
    tag = "Agent",
    request_body = AgentMessageRequest,
    responses(
        (status = 200, description = "Parsed actions", body = AgentReply),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn post_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<AgentMessageRequest>,
) -> Result<Json<AgentReply>, ApiError> {
    if request.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Message content is required".to_string()));
    }

    let reply = state.agent.process_message(auth.user_id, &request.content).await?;

    Ok(Json(reply))
}

/// The user's latest conversation with the agent, oldest message first
#[utoipa::path(
    get,
    path = "/api/agent/history",
    tag = "Agent",
    responses(
        (status = 200, description = "Conversation history", body = [Message]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state.agent.history(auth.user_id).await?;
    Ok(Json(messages))
}
