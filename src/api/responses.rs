use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::chain::StakeActivation;
use crate::database::enums::TriggerKind;
use crate::database::models::{StakeAccount, User};

/// Error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Request to create an account
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub wallet_address: Option<String>,
}

/// Request to sign in
#[derive(Debug, Deserialize, ToSchema)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// User as exposed over the API - never carries the password hash
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub wallet_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            wallet_address: user.wallet_address,
            created_at: user.created_at,
        }
    }
}

/// Response to signup and signin
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

/// Request to add a contact
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub name: String,
    pub wallet_address: String,
}

/// Query parameters for contact search
#[derive(Debug, Deserialize)]
pub struct ContactSearchQuery {
    pub q: String,
}

/// Generic acknowledgement for idempotent mutations
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Request to log a client-signed transaction
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub signature: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    #[schema(value_type = String, example = "0.25")]
    pub amount: Decimal,
    pub token: Option<String>,
    pub recipient: Option<String>,
}

// ---------------------------------------------------------------------------
// Stakes
// ---------------------------------------------------------------------------

/// Request to persist a stake account created client-side
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStakeRequest {
    pub stake_account_pubkey: String,
    pub validator_vote_key: String,
    #[schema(value_type = String, example = "5")]
    pub amount: Decimal,
}

/// A stake account enriched with live activation state
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StakeStatusResponse {
    pub id: Uuid,
    pub stake_account_pubkey: String,
    pub validator_vote_key: String,
    #[schema(value_type = String, example = "5")]
    pub amount: Decimal,
    pub activation_state: String,
    pub active_lamports: u64,
    pub created_at: DateTime<Utc>,
}

impl StakeStatusResponse {
    pub fn from_parts(stake: StakeAccount, activation: StakeActivation) -> Self {
        Self {
            id: stake.id,
            stake_account_pubkey: stake.stake_account_pubkey,
            validator_vote_key: stake.validator_vote_key,
            amount: stake.amount,
            activation_state: activation.state,
            active_lamports: activation.active_lamports,
            created_at: stake.created_at,
        }
    }
}

/// Activation state of a single stake account
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StakeActivationResponse {
    pub stake_account_pubkey: String,
    pub activation_state: String,
    pub active_lamports: u64,
}

// ---------------------------------------------------------------------------
// Scheduled tasks
// ---------------------------------------------------------------------------

/// Request to create a scheduled task
///
/// Exactly the trigger fields matching `trigger_type` must be provided.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub action_type: String,
    #[schema(value_type = Option<Object>)]
    pub action_payload: Option<serde_json::Value>,
    pub trigger_type: TriggerKind,
    pub trigger_at: Option<DateTime<Utc>>,
    pub trigger_token: Option<String>,
    #[schema(value_type = Option<String>, example = "250")]
    pub trigger_price: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "24")]
    pub idle_hours: Option<Decimal>,
    pub label: String,
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// A natural-language message for the intent agent
#[derive(Debug, Deserialize, ToSchema)]
pub struct AgentMessageRequest {
    pub content: String,
}
