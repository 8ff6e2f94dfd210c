use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{NewStakeAccount, StakeAccount};
use crate::database::schema::stake_accounts;
use diesel::prelude::*;
use std::sync::Arc;

/// Stake account repository trait
#[async_trait::async_trait]
pub trait StakeRepository: Send + Sync {
    async fn insert(&self, new_stake: NewStakeAccount) -> Result<StakeAccount, DatabaseError>;

    /// A user's stake accounts, newest first
    async fn list_by_user(&self, user_id: uuid::Uuid) -> Result<Vec<StakeAccount>, DatabaseError>;
}

/// Concrete implementation backed by the PostgreSQL pool
pub struct StakeRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl StakeRepositoryImpl {
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
impl StakeRepository for StakeRepositoryImpl {
    async fn insert(&self, new_stake: NewStakeAccount) -> Result<StakeAccount, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            diesel::insert_into(stake_accounts::table)
                .values(&new_stake)
                .get_result::<StakeAccount>(&mut conn)
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }

    async fn list_by_user(&self, user_id: uuid::Uuid) -> Result<Vec<StakeAccount>, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            stake_accounts::table
                .filter(stake_accounts::user_id.eq(user_id))
                .order(stake_accounts::created_at.desc())
                .load::<StakeAccount>(&mut conn)
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }
}
