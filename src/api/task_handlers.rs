use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::database::enums::{TaskStatus, TriggerKind};
use crate::database::models::{NewScheduledTask, ScheduledTask};

use super::error::ApiError;
use super::responses::*;
use super::AppState;

/// Validate that the request populates exactly the field group its trigger
/// type requires
fn validate_trigger_fields(request: &CreateTaskRequest) -> Result<(), ApiError> {
    match request.trigger_type {
        TriggerKind::Time => {
            if request.trigger_at.is_none() {
                return Err(ApiError::BadRequest(
                    "triggerAt is required for time triggers".to_string(),
                ));
            }
        }
        TriggerKind::PriceGte | TriggerKind::PriceLte => {
            if request.trigger_token.is_none() || request.trigger_price.is_none() {
                return Err(ApiError::BadRequest(
                    "triggerToken and triggerPrice are required for price triggers".to_string(),
                ));
            }
        }
        TriggerKind::Idle => match request.idle_hours {
            Some(hours) if hours > Decimal::ZERO => {}
            _ => {
                return Err(ApiError::BadRequest(
                    "idleHours must be a positive number for idle triggers".to_string(),
                ));
            }
        },
    }
    Ok(())
}

/// Create a scheduled task
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Scheduled Tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = ScheduledTask),
        (status = 400, description = "Trigger fields inconsistent with trigger type", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<ScheduledTask>), ApiError> {
    validate_trigger_fields(&request)?;

    let mut new_task = NewScheduledTask::new(
        auth.user_id,
        request.action_type,
        request.action_payload,
        request.trigger_type,
        request.label,
    );
    new_task.trigger_at = request.trigger_at;
    new_task.trigger_token = request.trigger_token;
    new_task.trigger_price = request.trigger_price;
    new_task.idle_hours = request.idle_hours;

    let task = state.tasks.create(new_task).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// List the user's pending and triggered tasks, newest first
///
/// Cancelled and dismissed tasks are omitted - they no longer concern the
/// dashboard.
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Scheduled Tasks",
    responses(
        (status = 200, description = "Active tasks", body = [ScheduledTask]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ScheduledTask>>, ApiError> {
    let tasks = state.tasks.list_active(auth.user_id).await?;
    Ok(Json(tasks))
}

/// Cancel a pending task
///
/// Conditional on the task still being pending: cancelling a task that
/// already triggered (or was cancelled before) is a harmless no-op, and a
/// cancel that beats the trigger job to the row suppresses its
/// notification for good.
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "Scheduled Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Cancel applied (or already settled)", body = SuccessResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .tasks
        .update_status(id, auth.user_id, TaskStatus::Pending, TaskStatus::Cancelled)
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Dismiss a triggered task from the dashboard
#[utoipa::path(
    patch,
    path = "/api/tasks/{id}/dismiss",
    tag = "Scheduled Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Dismiss applied (or already settled)", body = SuccessResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn dismiss_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .tasks
        .update_status(id, auth.user_id, TaskStatus::Triggered, TaskStatus::Dismissed)
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}
