use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::Pg;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use utoipa::ToSchema;

/// Lifecycle state of a scheduled task
///
/// Legal transitions:
/// - `Pending -> Triggered` (the trigger job found the condition satisfied)
/// - `Pending -> Cancelled` (the owner withdrew the task)
/// - `Triggered -> Dismissed` (the owner acknowledged the notification)
///
/// Every other transition is a no-op at the store level - the conditional
/// status update simply matches zero rows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Triggered,
    Cancelled,
    Dismissed,
}

impl TaskStatus {
    /// Convert enum to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Triggered => "triggered",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Dismissed => "dismissed",
        }
    }

    /// Parse string to TaskStatus enum
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "triggered" => Some(TaskStatus::Triggered),
            "cancelled" => Some(TaskStatus::Cancelled),
            "dismissed" => Some(TaskStatus::Dismissed),
            _ => None,
        }
    }

    /// Whether moving from `self` to `next` is a legal lifecycle transition
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Triggered)
                | (TaskStatus::Pending, TaskStatus::Cancelled)
                | (TaskStatus::Triggered, TaskStatus::Dismissed)
        )
    }

    /// Whether a task in this state is still subject to trigger evaluation
    pub fn is_evaluable(&self) -> bool {
        *self == TaskStatus::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql<Text, Pg> for TaskStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<Text, Pg> for TaskStatus {
    fn from_sql(bytes: <Pg as diesel::backend::Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        TaskStatus::from_str(&text).ok_or_else(|| format!("Invalid task status: {}", text).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::Triggered,
            TaskStatus::Cancelled,
            TaskStatus::Dismissed,
        ] {
            assert_eq!(TaskStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::from_str("expired"), None);
    }

    #[test]
    fn test_legal_transitions() {
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Triggered));
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Cancelled));
        assert!(TaskStatus::Triggered.can_transition_to(TaskStatus::Dismissed));
    }

    #[test]
    fn test_illegal_transitions_are_rejected() {
        // A triggered task can never go back to pending or on to cancelled
        assert!(!TaskStatus::Triggered.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::Triggered.can_transition_to(TaskStatus::Cancelled));
        // Terminal states stay terminal
        assert!(!TaskStatus::Cancelled.can_transition_to(TaskStatus::Triggered));
        assert!(!TaskStatus::Cancelled.can_transition_to(TaskStatus::Dismissed));
        assert!(!TaskStatus::Dismissed.can_transition_to(TaskStatus::Pending));
        // Self-transitions are no-ops, not legal moves
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Pending));
    }

    #[test]
    fn test_only_pending_is_evaluable() {
        assert!(TaskStatus::Pending.is_evaluable());
        assert!(!TaskStatus::Triggered.is_evaluable());
        assert!(!TaskStatus::Cancelled.is_evaluable());
        assert!(!TaskStatus::Dismissed.is_evaluable());
    }
}
