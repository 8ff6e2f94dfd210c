use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Contact entity - a named wallet address in a user's address book
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::database::schema::contacts)]
pub struct Contact {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub wallet_address: String,
    pub created_at: DateTime<Utc>,
}

/// New contact for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::contacts)]
pub struct NewContact {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub wallet_address: String,
}

impl NewContact {
    pub fn new(user_id: Uuid, name: String, wallet_address: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            wallet_address,
        }
    }
}
