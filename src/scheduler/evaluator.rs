use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::database::enums::TriggerKind;
use crate::database::models::ScheduledTask;

/// A fully-specified trigger condition
///
/// Task rows store the condition as a type tag plus optional columns; this
/// enum is the validated in-memory form, carrying exactly the fields its
/// variant needs. Rows whose columns don't match their tag have no valid
/// condition and are treated as never firing rather than as errors, so bad
/// data written outside this service cannot stall the trigger job.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerCondition {
    /// Fire at or after a fixed point in time
    Time { at: DateTime<Utc> },
    /// Fire when the price reaches or exceeds the threshold
    PriceGte { token: String, price: Decimal },
    /// Fire when the price reaches or falls below the threshold
    PriceLte { token: String, price: Decimal },
    /// Fire once the task has sat untouched for this many hours
    ///
    /// Measured from task creation, not from the owner's last activity.
    /// A deliberate approximation: an active owner is assumed to have
    /// cancelled or dismissed the task along the way.
    Idle { hours: Decimal },
}

impl TriggerCondition {
    /// Parse the condition out of a task row, if its fields are consistent
    pub fn parse(task: &ScheduledTask) -> Option<Self> {
        match task.trigger_type {
            TriggerKind::Time => task.trigger_at.map(|at| TriggerCondition::Time { at }),
            TriggerKind::PriceGte => match (&task.trigger_token, task.trigger_price) {
                (Some(token), Some(price)) => Some(TriggerCondition::PriceGte {
                    token: token.clone(),
                    price,
                }),
                _ => None,
            },
            TriggerKind::PriceLte => match (&task.trigger_token, task.trigger_price) {
                (Some(token), Some(price)) => Some(TriggerCondition::PriceLte {
                    token: token.clone(),
                    price,
                }),
                _ => None,
            },
            TriggerKind::Idle => task
                .idle_hours
                .filter(|h| *h > Decimal::ZERO)
                .map(|hours| TriggerCondition::Idle { hours }),
        }
    }

    /// Whether evaluating this condition requires a price sample
    pub fn is_price_based(&self) -> bool {
        matches!(
            self,
            TriggerCondition::PriceGte { .. } | TriggerCondition::PriceLte { .. }
        )
    }
}

/// Decide whether a condition is satisfied - pure, no I/O
///
/// `price` is the tick's shared sample for the native token; `None` means
/// no price data is available, which makes price conditions evaluate to
/// false for this tick rather than erroring. Both price comparisons are
/// inclusive. The `token` field of price conditions is not consulted:
/// pricing currently assumes the single native token.
pub fn should_trigger(
    condition: &TriggerCondition,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    price: Option<Decimal>,
) -> bool {
    match condition {
        TriggerCondition::Time { at } => now >= *at,
        TriggerCondition::PriceGte { price: threshold, .. } => {
            matches!(price, Some(p) if p >= *threshold)
        }
        TriggerCondition::PriceLte { price: threshold, .. } => {
            matches!(price, Some(p) if p <= *threshold)
        }
        TriggerCondition::Idle { hours } => {
            let elapsed_secs = (now - created_at).num_seconds();
            if elapsed_secs < 0 {
                return false;
            }
            Decimal::from(elapsed_secs) >= *hours * Decimal::from(3600)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::database::enums::TaskStatus;

    fn base_task(trigger_type: TriggerKind) -> ScheduledTask {
        ScheduledTask {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status: TaskStatus::Pending,
            action_type: "transfer".to_string(),
            action_payload: None,
            trigger_type,
            trigger_at: None,
            trigger_token: None,
            trigger_price: None,
            idle_hours: None,
            label: "send 1 SOL".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_time_trigger_boundary() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let condition = TriggerCondition::Time { at };
        let created = at - Duration::hours(12);

        // One second early: no. At the boundary and after: yes.
        assert!(!should_trigger(&condition, created, at - Duration::seconds(1), None));
        assert!(should_trigger(&condition, created, at, None));
        assert!(should_trigger(&condition, created, at + Duration::hours(3), None));
    }

    #[test]
    fn test_price_gte_is_inclusive() {
        let condition = TriggerCondition::PriceGte {
            token: "SOL".to_string(),
            price: dec!(100),
        };
        let now = Utc::now();

        assert!(!should_trigger(&condition, now, now, Some(dec!(99.99))));
        assert!(should_trigger(&condition, now, now, Some(dec!(100))));
        assert!(should_trigger(&condition, now, now, Some(dec!(101))));
    }

    #[test]
    fn test_price_lte_is_inclusive() {
        let condition = TriggerCondition::PriceLte {
            token: "SOL".to_string(),
            price: dec!(100),
        };
        let now = Utc::now();

        assert!(should_trigger(&condition, now, now, Some(dec!(99))));
        assert!(should_trigger(&condition, now, now, Some(dec!(100))));
        assert!(!should_trigger(&condition, now, now, Some(dec!(100.01))));
    }

    #[test]
    fn test_price_conditions_without_price_never_fire() {
        let gte = TriggerCondition::PriceGte {
            token: "SOL".to_string(),
            price: dec!(1),
        };
        let lte = TriggerCondition::PriceLte {
            token: "SOL".to_string(),
            price: dec!(1000000),
        };
        let now = Utc::now();

        assert!(!should_trigger(&gte, now, now, None));
        assert!(!should_trigger(&lte, now, now, None));
    }

    #[test]
    fn test_idle_trigger_measures_time_since_creation() {
        let condition = TriggerCondition::Idle { hours: dec!(24) };
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();

        assert!(!should_trigger(
            &condition,
            created,
            created + Duration::hours(23) + Duration::minutes(59),
            None
        ));
        assert!(should_trigger(&condition, created, created + Duration::hours(24), None));
        assert!(should_trigger(&condition, created, created + Duration::days(3), None));
    }

    #[test]
    fn test_idle_trigger_fractional_hours() {
        let condition = TriggerCondition::Idle { hours: dec!(0.5) };
        let created = Utc::now();

        assert!(!should_trigger(&condition, created, created + Duration::minutes(29), None));
        assert!(should_trigger(&condition, created, created + Duration::minutes(30), None));
    }

    #[test]
    fn test_parse_time_condition() {
        let mut task = base_task(TriggerKind::Time);
        assert_eq!(TriggerCondition::parse(&task), None);

        let at = Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap();
        task.trigger_at = Some(at);
        assert_eq!(TriggerCondition::parse(&task), Some(TriggerCondition::Time { at }));
    }

    #[test]
    fn test_parse_price_condition_requires_both_fields() {
        let mut task = base_task(TriggerKind::PriceGte);
        task.trigger_price = Some(dec!(250));
        // Missing token: inconsistent row, no condition
        assert_eq!(TriggerCondition::parse(&task), None);

        task.trigger_token = Some("SOL".to_string());
        assert_eq!(
            TriggerCondition::parse(&task),
            Some(TriggerCondition::PriceGte {
                token: "SOL".to_string(),
                price: dec!(250),
            })
        );
    }

    #[test]
    fn test_parse_idle_condition_rejects_non_positive_hours() {
        let mut task = base_task(TriggerKind::Idle);
        task.idle_hours = Some(dec!(0));
        assert_eq!(TriggerCondition::parse(&task), None);

        task.idle_hours = Some(dec!(-2));
        assert_eq!(TriggerCondition::parse(&task), None);

        task.idle_hours = Some(dec!(24));
        assert_eq!(
            TriggerCondition::parse(&task),
            Some(TriggerCondition::Idle { hours: dec!(24) })
        );
    }
}
