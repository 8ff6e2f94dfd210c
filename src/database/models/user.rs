use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User entity - an account holder
///
/// The password hash never leaves the database layer; API responses are
/// built from [`crate::api::responses::UserResponse`], which omits it.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::database::schema::users)]
pub struct User {
    pub id: Uuid,

    /// Login identity, unique
    pub email: String,

    /// Display name (optional)
    pub name: Option<String>,

    /// bcrypt hash of the password
    pub password_hash: String,

    /// Linked wallet address (optional, unique when set)
    pub wallet_address: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// New user for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub wallet_address: Option<String>,
}

impl NewUser {
    pub fn new(
        email: String,
        name: Option<String>,
        password_hash: String,
        wallet_address: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash,
            wallet_address,
        }
    }
}
