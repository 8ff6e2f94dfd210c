use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stake account entity - a delegation the user created client-side
///
/// Live activation state is not stored; it is queried from the chain when
/// the list is served and degrades to "unknown" per account on RPC failure.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::database::schema::stake_accounts)]
pub struct StakeAccount {
    pub id: Uuid,
    pub user_id: Uuid,

    /// Address of the stake account itself
    pub stake_account_pubkey: String,

    /// Vote key of the validator the stake is delegated to
    pub validator_vote_key: String,

    #[schema(value_type = String, example = "5")]
    pub amount: Decimal,

    pub created_at: DateTime<Utc>,
}

/// New stake account for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::stake_accounts)]
pub struct NewStakeAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stake_account_pubkey: String,
    pub validator_vote_key: String,
    pub amount: Decimal,
}

impl NewStakeAccount {
    pub fn new(
        user_id: Uuid,
        stake_account_pubkey: String,
        validator_vote_key: String,
        amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            stake_account_pubkey,
            validator_vote_key,
            amount,
        }
    }
}
