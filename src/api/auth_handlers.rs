use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::auth::AuthUser;
use crate::database::models::NewUser;

use super::error::ApiError;
use super::responses::*;
use super::AppState;

/// Create an account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
        (status = 409, description = "Email or wallet address already in use", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest("Email and password are required".to_string()));
    }

    if state.users.find_by_email(&request.email).await?.is_some() {
        return Err(ApiError::Conflict("A user with this email already exists".to_string()));
    }

    if let Some(wallet) = &request.wallet_address {
        if state.users.find_by_wallet(wallet).await?.is_some() {
            return Err(ApiError::Conflict(
                "A user with this wallet address already exists".to_string(),
            ));
        }
    }

    let password_hash = state
        .auth
        .hash_password(&request.password)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let user = state
        .users
        .insert(NewUser::new(
            request.email,
            request.name,
            password_hash,
            request.wallet_address,
        ))
        .await?;

    let token = state
        .auth
        .generate_token(user.id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    tag = "Auth",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    Json(request): Json<SigninRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .users
        .find_by_email(&request.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = state
        .auth
        .verify_password(&request.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    if !valid {
        return Err(ApiError::Unauthorized("Invalid email or password".to_string()));
    }

    let token = state
        .auth
        .generate_token(user.id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// The authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}
