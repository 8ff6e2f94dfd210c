use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::AuthUser;
use crate::chain::StakeActivation;
use crate::database::models::{NewStakeAccount, StakeAccount};

use super::error::ApiError;
use super::responses::*;
use super::AppState;

/// Persist a stake account created client-side
#[utoipa::path(
    post,
    path = "/api/stakes",
    tag = "Stakes",
    request_body = CreateStakeRequest,
    responses(
        (status = 201, description = "Stake account recorded", body = StakeAccount),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_stake(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateStakeRequest>,
) -> Result<(StatusCode, Json<StakeAccount>), ApiError> {
    let stake = state
        .stakes
        .insert(NewStakeAccount::new(
            auth.user_id,
            request.stake_account_pubkey,
            request.validator_vote_key,
            request.amount,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(stake)))
}

/// List the user's stake accounts with live activation state
///
/// An RPC failure for one account degrades that row to "unknown" rather
/// than failing the whole listing.
#[utoipa::path(
    get,
    path = "/api/stakes",
    tag = "Stakes",
    responses(
        (status = 200, description = "Stake accounts", body = [StakeStatusResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_stakes(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<StakeStatusResponse>>, ApiError> {
    let stakes = state.stakes.list_by_user(auth.user_id).await?;

    // One RPC lookup per account, in parallel; failures degrade per row
    let lookups = stakes.into_iter().map(|stake| {
        let chain = state.chain.clone();
        async move {
            let activation = match chain.stake_activation(&stake.stake_account_pubkey).await {
                Ok(activation) => activation,
                Err(e) => {
                    tracing::warn!(
                        "Activation lookup for {} failed: {}",
                        stake.stake_account_pubkey,
                        e
                    );
                    StakeActivation::unknown()
                }
            };
            StakeStatusResponse::from_parts(stake, activation)
        }
    });

    let enriched = futures::future::join_all(lookups).await;

    Ok(Json(enriched))
}

/// Activation state of a single stake account
#[utoipa::path(
    get,
    path = "/api/stakes/{pubkey}/status",
    tag = "Stakes",
    params(("pubkey" = String, Path, description = "Stake account address")),
    responses(
        (status = 200, description = "Activation state", body = StakeActivationResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Chain RPC unavailable", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn stake_status(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(pubkey): Path<String>,
) -> Result<Json<StakeActivationResponse>, ApiError> {
    let activation = state
        .chain
        .stake_activation(&pubkey)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(StakeActivationResponse {
        stake_account_pubkey: pubkey,
        activation_state: activation.state,
        active_lamports: activation.active_lamports,
    }))
}
