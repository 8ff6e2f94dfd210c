use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::Pg;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use utoipa::ToSchema;

/// Category of condition gating a scheduled task
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Fire at or after a fixed timestamp
    Time,
    /// Fire when the tracked price reaches or exceeds a threshold
    PriceGte,
    /// Fire when the tracked price reaches or falls below a threshold
    PriceLte,
    /// Fire after a number of hours without the task being acted on
    Idle,
}

impl TriggerKind {
    /// Convert enum to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Time => "time",
            TriggerKind::PriceGte => "price_gte",
            TriggerKind::PriceLte => "price_lte",
            TriggerKind::Idle => "idle",
        }
    }

    /// Parse string to TriggerKind enum
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "time" => Some(TriggerKind::Time),
            "price_gte" => Some(TriggerKind::PriceGte),
            "price_lte" => Some(TriggerKind::PriceLte),
            "idle" => Some(TriggerKind::Idle),
            _ => None,
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql<Text, Pg> for TriggerKind {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<Text, Pg> for TriggerKind {
    fn from_sql(bytes: <Pg as diesel::backend::Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        TriggerKind::from_str(&text).ok_or_else(|| format!("Invalid trigger type: {}", text).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_kind_round_trip() {
        for kind in [
            TriggerKind::Time,
            TriggerKind::PriceGte,
            TriggerKind::PriceLte,
            TriggerKind::Idle,
        ] {
            assert_eq!(TriggerKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(TriggerKind::from_str("price_eq"), None);
    }
}
