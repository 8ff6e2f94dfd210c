use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{Contact, NewContact};
use crate::database::schema::contacts;
use diesel::prelude::*;
use std::sync::Arc;

/// Contact repository trait - per-user address book operations
#[async_trait::async_trait]
pub trait ContactRepository: Send + Sync {
    async fn insert(&self, new_contact: NewContact) -> Result<Contact, DatabaseError>;

    /// All of a user's contacts, newest first
    async fn list_by_user(&self, user_id: uuid::Uuid) -> Result<Vec<Contact>, DatabaseError>;

    /// Case-insensitive substring search over name and wallet address
    async fn search(&self, user_id: uuid::Uuid, query: &str) -> Result<Vec<Contact>, DatabaseError>;

    /// Delete a contact if it belongs to the user; returns whether a row was removed
    async fn delete(&self, user_id: uuid::Uuid, contact_id: uuid::Uuid) -> Result<bool, DatabaseError>;
}

/// Concrete implementation backed by the PostgreSQL pool
pub struct ContactRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl ContactRepositoryImpl {
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
impl ContactRepository for ContactRepositoryImpl {
    async fn insert(&self, new_contact: NewContact) -> Result<Contact, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            diesel::insert_into(contacts::table)
                .values(&new_contact)
                .get_result::<Contact>(&mut conn)
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }

    async fn list_by_user(&self, user_id: uuid::Uuid) -> Result<Vec<Contact>, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            contacts::table
                .filter(contacts::user_id.eq(user_id))
                .order(contacts::created_at.desc())
                .load::<Contact>(&mut conn)
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }

    async fn search(&self, user_id: uuid::Uuid, query: &str) -> Result<Vec<Contact>, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);
        let pattern = format!("%{}%", query);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            contacts::table
                .filter(contacts::user_id.eq(user_id))
                .filter(
                    contacts::name
                        .ilike(pattern.clone())
                        .or(contacts::wallet_address.ilike(pattern)),
                )
                .order(contacts::created_at.desc())
                .load::<Contact>(&mut conn)
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }

    async fn delete(&self, user_id: uuid::Uuid, contact_id: uuid::Uuid) -> Result<bool, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            // Ownership check folded into the delete itself
            let deleted = diesel::delete(contacts::table)
                .filter(contacts::id.eq(contact_id))
                .filter(contacts::user_id.eq(user_id))
                .execute(&mut conn)?;

            Ok(deleted > 0)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }
}
