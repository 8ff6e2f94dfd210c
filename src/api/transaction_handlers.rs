use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::auth::AuthUser;
use crate::database::models::{NewTransaction, Transaction};

use super::error::ApiError;
use super::responses::*;
use super::AppState;

/// Log a client-signed transaction
#[utoipa::path(
    post,
    path = "/api/transactions",
    tag = "Transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = Transaction),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let mut new_tx = NewTransaction::new(
        auth.user_id,
        request.signature,
        request.tx_type,
        request.amount,
    );
    if let Some(token) = request.token {
        new_tx = new_tx.with_token(token);
    }
    if let Some(recipient) = request.recipient {
        new_tx = new_tx.with_recipient(recipient);
    }

    let transaction = state.transactions.insert(new_tx).await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// List the user's transactions, newest first
#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "Transactions",
    responses(
        (status = 200, description = "Transactions", body = [Transaction]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let transactions = state.transactions.list_by_user(auth.user_id).await?;
    Ok(Json(transactions))
}
