use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{Chat, Message, NewChat, NewMessage};
use crate::database::schema::{chats, messages};
use diesel::prelude::*;
use std::sync::Arc;

/// Chat repository trait - conversation persistence for the intent agent
#[async_trait::async_trait]
pub trait ChatRepository: Send + Sync {
    /// The user's most recent chat, if any
    async fn latest_chat(&self, user_id: uuid::Uuid) -> Result<Option<Chat>, DatabaseError>;

    async fn create_chat(&self, new_chat: NewChat) -> Result<Chat, DatabaseError>;

    async fn insert_message(&self, new_message: NewMessage) -> Result<Message, DatabaseError>;

    /// Messages of a chat in chronological order
    async fn list_messages(&self, chat_id: uuid::Uuid) -> Result<Vec<Message>, DatabaseError>;
}

/// Concrete implementation backed by the PostgreSQL pool
pub struct ChatRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl ChatRepositoryImpl {
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

#[async_trait::async_trait]
impl ChatRepository for ChatRepositoryImpl {
    async fn latest_chat(&self, user_id: uuid::Uuid) -> Result<Option<Chat>, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            chats::table
                .filter(chats::user_id.eq(user_id))
                .order(chats::created_at.desc())
                .first::<Chat>(&mut conn)
                .optional()
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }

    async fn create_chat(&self, new_chat: NewChat) -> Result<Chat, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            diesel::insert_into(chats::table)
                .values(&new_chat)
                .get_result::<Chat>(&mut conn)
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }

    async fn insert_message(&self, new_message: NewMessage) -> Result<Message, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            diesel::insert_into(messages::table)
                .values(&new_message)
                .get_result::<Message>(&mut conn)
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }

    async fn list_messages(&self, chat_id: uuid::Uuid) -> Result<Vec<Message>, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            messages::table
                .filter(messages::chat_id.eq(chat_id))
                .order(messages::created_at.asc())
                .load::<Message>(&mut conn)
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }
}
