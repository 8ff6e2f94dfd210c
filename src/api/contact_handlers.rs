use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::database::models::{Contact, NewContact};

use super::error::ApiError;
use super::responses::*;
use super::AppState;

/// Add a contact
#[utoipa::path(
    post,
    path = "/api/contacts",
    tag = "Contacts",
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Contact created", body = Contact),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_contact(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    if request.name.is_empty() || request.wallet_address.is_empty() {
        return Err(ApiError::BadRequest("Name and wallet address are required".to_string()));
    }

    let contact = state
        .contacts
        .insert(NewContact::new(auth.user_id, request.name, request.wallet_address))
        .await?;

    Ok((StatusCode::CREATED, Json(contact)))
}

/// List the user's contacts, newest first
#[utoipa::path(
    get,
    path = "/api/contacts",
    tag = "Contacts",
    responses(
        (status = 200, description = "Contacts", body = [Contact]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let contacts = state.contacts.list_by_user(auth.user_id).await?;
    Ok(Json(contacts))
}

/// Search contacts by name or wallet address (case-insensitive)
#[utoipa::path(
    get,
    path = "/api/contacts/search",
    tag = "Contacts",
    params(("q" = String, Query, description = "Substring to match")),
    responses(
        (status = 200, description = "Matching contacts", body = [Contact]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn search_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ContactSearchQuery>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let contacts = state.contacts.search(auth.user_id, &query.q).await?;
    Ok(Json(contacts))
}

/// Delete a contact
#[utoipa::path(
    delete,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Contact deleted", body = SuccessResponse),
        (status = 404, description = "Contact not found", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let deleted = state.contacts.delete(auth.user_id, id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Contact not found".to_string()));
    }

    Ok(Json(SuccessResponse { success: true }))
}
