use axum::extract::State;
use axum::Json;

use crate::auth::AuthUser;
use crate::dashboard::{self, DashboardSummary};

use super::error::ApiError;
use super::responses::ErrorResponse;
use super::AppState;

/// Aggregated dashboard for the authenticated user
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Dashboard aggregates", body = DashboardSummary),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DashboardSummary>, ApiError> {
    // The three source queries are independent; run them concurrently
    let (transactions, stakes, contacts) = tokio::try_join!(
        state.transactions.list_by_user(auth.user_id),
        state.stakes.list_by_user(auth.user_id),
        state.contacts.list_by_user(auth.user_id),
    )?;

    Ok(Json(dashboard::aggregate(&transactions, &stakes, &contacts)))
}
