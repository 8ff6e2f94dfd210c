use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{NewUser, User};
use crate::database::schema::users;
use diesel::prelude::*;
use std::sync::Arc;

/// User repository trait - account lookup and creation
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: uuid::Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_by_wallet(&self, wallet_address: &str) -> Result<Option<User>, DatabaseError>;

    async fn insert(&self, new_user: NewUser) -> Result<User, DatabaseError>;
}

/// Concrete implementation backed by the PostgreSQL pool
pub struct UserRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl UserRepositoryImpl {
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
impl UserRepository for UserRepositoryImpl {
    async fn find_by_id(&self, id: uuid::Uuid) -> Result<Option<User>, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            users::table
                .filter(users::id.eq(id))
                .first::<User>(&mut conn)
                .optional()
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);
        let email = email.to_string();

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            users::table
                .filter(users::email.eq(email))
                .first::<User>(&mut conn)
                .optional()
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }

    async fn find_by_wallet(&self, wallet_address: &str) -> Result<Option<User>, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);
        let wallet_address = wallet_address.to_string();

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            users::table
                .filter(users::wallet_address.eq(wallet_address))
                .first::<User>(&mut conn)
                .optional()
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            diesel::insert_into(users::table)
                .values(&new_user)
                .get_result::<User>(&mut conn)
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }
}
