use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::enums::{TaskStatus, TriggerKind};

/// Scheduled task entity - a deferred, conditional wallet action
///
/// The action itself (`action_type` + `action_payload`) is opaque to the
/// server: when the trigger fires it is pushed back to the owner, who signs
/// and submits the resulting transaction client-side.
///
/// Exactly one trigger-field group is expected to be populated, matching
/// `trigger_type`. That is a caller contract - rows that violate it are not
/// rejected here, they simply never produce a parseable trigger condition
/// and therefore never fire.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::database::schema::scheduled_tasks)]
pub struct ScheduledTask {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: TaskStatus,

    /// Opaque action category ("transfer", "swap", ...) passed through to the client
    pub action_type: String,

    /// Opaque action parameters passed through to the client
    #[schema(value_type = Option<Object>)]
    pub action_payload: Option<serde_json::Value>,

    pub trigger_type: TriggerKind,

    /// Fire-at timestamp, meaningful only for `time` triggers
    pub trigger_at: Option<DateTime<Utc>>,

    /// Token symbol, meaningful only for price triggers
    pub trigger_token: Option<String>,

    /// Price threshold in USD, meaningful only for price triggers
    #[schema(value_type = Option<String>, example = "250")]
    pub trigger_price: Option<Decimal>,

    /// Inactivity window in hours, meaningful only for `idle` triggers
    #[schema(value_type = Option<String>, example = "24")]
    pub idle_hours: Option<Decimal>,

    /// Human-readable description shown in notifications
    pub label: String,

    pub created_at: DateTime<Utc>,
}

/// New scheduled task for insertion; always starts out pending
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::scheduled_tasks)]
pub struct NewScheduledTask {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: TaskStatus,
    pub action_type: String,
    pub action_payload: Option<serde_json::Value>,
    pub trigger_type: TriggerKind,
    pub trigger_at: Option<DateTime<Utc>>,
    pub trigger_token: Option<String>,
    pub trigger_price: Option<Decimal>,
    pub idle_hours: Option<Decimal>,
    pub label: String,
}

impl NewScheduledTask {
    pub fn new(
        user_id: Uuid,
        action_type: String,
        action_payload: Option<serde_json::Value>,
        trigger_type: TriggerKind,
        label: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            status: TaskStatus::Pending,
            action_type,
            action_payload,
            trigger_type,
            trigger_at: None,
            trigger_token: None,
            trigger_price: None,
            idle_hours: None,
            label,
        }
    }

    pub fn with_trigger_at(mut self, at: DateTime<Utc>) -> Self {
        self.trigger_at = Some(at);
        self
    }

    pub fn with_price_trigger(mut self, token: String, price: Decimal) -> Self {
        self.trigger_token = Some(token);
        self.trigger_price = Some(price);
        self
    }

    pub fn with_idle_hours(mut self, hours: Decimal) -> Self {
        self.idle_hours = Some(hours);
        self
    }
}

/// A pending task joined with the metadata the trigger job needs
///
/// Carrying the owner's email out of the single `list_pending` query keeps
/// the tick at one round trip per batch instead of one per task.
#[derive(Debug, Clone)]
pub struct PendingTask {
    pub task: ScheduledTask,
    pub owner_email: String,
}

impl From<(ScheduledTask, String)> for PendingTask {
    fn from((task, owner_email): (ScheduledTask, String)) -> Self {
        Self { task, owner_email }
    }
}
