use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::enums::TaskStatus;
use crate::database::models::{NewScheduledTask, PendingTask, ScheduledTask};
use crate::database::schema::{scheduled_tasks, users};
use diesel::prelude::*;
use std::sync::Arc;

/// Scheduled-task repository trait - the persistence boundary of the trigger engine
///
/// `update_status` is the single concurrency primitive of the whole engine:
/// a compare-and-set on the status column. When the trigger job and a user
/// cancel race on the same row, the store lets exactly one of them through.
#[async_trait::async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a new task (status must be pending)
    async fn create(&self, new_task: NewScheduledTask) -> Result<ScheduledTask, DatabaseError>;

    /// Tasks a user still cares about: pending and triggered, newest first
    async fn list_active(&self, user_id: uuid::Uuid) -> Result<Vec<ScheduledTask>, DatabaseError>;

    /// All pending tasks across users, joined with the owner's email
    ///
    /// Used only by the trigger job; the join avoids a per-task user lookup.
    async fn list_pending(&self) -> Result<Vec<PendingTask>, DatabaseError>;

    /// Conditional status update: applies only if the row currently has
    /// `expected` status (and belongs to `user_id`). Returns whether a row
    /// actually changed.
    async fn update_status(
        &self,
        id: uuid::Uuid,
        user_id: uuid::Uuid,
        expected: TaskStatus,
        new_status: TaskStatus,
    ) -> Result<bool, DatabaseError>;
}

/// Concrete implementation backed by the PostgreSQL pool
pub struct TaskRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl TaskRepositoryImpl {
    /// Create a new task repository with a connection provider
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
impl TaskRepository for TaskRepositoryImpl {
    async fn create(&self, new_task: NewScheduledTask) -> Result<ScheduledTask, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            diesel::insert_into(scheduled_tasks::table)
                .values(&new_task)
                .get_result::<ScheduledTask>(&mut conn)
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }

    async fn list_active(&self, user_id: uuid::Uuid) -> Result<Vec<ScheduledTask>, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            scheduled_tasks::table
                .filter(scheduled_tasks::user_id.eq(user_id))
                .filter(
                    scheduled_tasks::status
                        .eq(TaskStatus::Pending)
                        .or(scheduled_tasks::status.eq(TaskStatus::Triggered)),
                )
                .order(scheduled_tasks::created_at.desc())
                .load::<ScheduledTask>(&mut conn)
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }

    async fn list_pending(&self) -> Result<Vec<PendingTask>, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            let rows = scheduled_tasks::table
                .inner_join(users::table)
                .filter(scheduled_tasks::status.eq(TaskStatus::Pending))
                .select((ScheduledTask::as_select(), users::email))
                .load::<(ScheduledTask, String)>(&mut conn)
                .map_err(DatabaseError::from)?;

            Ok(rows.into_iter().map(PendingTask::from).collect())
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }

    async fn update_status(
        &self,
        id: uuid::Uuid,
        user_id: uuid::Uuid,
        expected: TaskStatus,
        new_status: TaskStatus,
    ) -> Result<bool, DatabaseError> {
        let get_conn = Arc::clone(&self.get_conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = (get_conn)()?;

            // The WHERE clause on the current status is what makes this a
            // compare-and-set; concurrent updaters see affected-rows = 0.
            let updated = diesel::update(scheduled_tasks::table)
                .filter(scheduled_tasks::id.eq(id))
                .filter(scheduled_tasks::user_id.eq(user_id))
                .filter(scheduled_tasks::status.eq(expected))
                .set(scheduled_tasks::status.eq(new_status))
                .execute(&mut conn)?;

            Ok(updated > 0)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoinError(e.to_string()))?
    }
}
