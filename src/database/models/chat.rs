use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Chat entity - one conversation thread between a user and the intent agent
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::database::schema::chats)]
pub struct Chat {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// New chat for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::chats)]
pub struct NewChat {
    pub id: Uuid,
    pub user_id: Uuid,
}

impl NewChat {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
        }
    }
}

/// Message entity - a single utterance in a chat, from the user or the agent
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::database::schema::messages)]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,

    /// "user" or "agent"
    pub role: String,

    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// New message for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::messages)]
pub struct NewMessage {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub role: String,
    pub content: String,
}

impl NewMessage {
    pub fn new(chat_id: Uuid, role: &str, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            chat_id,
            role: role.to_string(),
            content,
        }
    }
}
