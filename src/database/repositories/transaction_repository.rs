use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{NewTransaction, Transaction};
use crate::database::schema::transactions;
use diesel::prelude::*;
use std::sync::Arc;

/// Transaction repository trait - the append-only activity log
#[async_trait::async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(&self, new_tx: NewTransaction) -> Result<Transaction, DatabaseError>;

    /// A user's transactions, newest first
    async fn list_by_user(&self, user_id: uuid::Uuid) -> Result<Vec<Transaction>, DatabaseError>;
}

/// Concrete implementation backed by the PostgreSQL pool
pub struct TransactionRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl TransactionRepositoryImpl {
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
impl TransactionRepository for TransactionRepositoryImpl {
    async fn insert(&self, new_tx: NewTransaction) -> Result<Transaction, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            diesel::insert_into(transactions::table)
                .values(&new_tx)
                .get_result::<Transaction>(&mut conn)
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }

    async fn list_by_user(&self, user_id: uuid::Uuid) -> Result<Vec<Transaction>, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            transactions::table
                .filter(transactions::user_id.eq(user_id))
                .order(transactions::created_at.desc())
                .load::<Transaction>(&mut conn)
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }
}
