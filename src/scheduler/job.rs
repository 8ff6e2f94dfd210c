use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::database::connection::DatabaseError;
use crate::database::enums::TaskStatus;
use crate::database::models::PendingTask;
use crate::database::repositories::TaskRepository;
use crate::notifications::{Mailer, SseHub};
use crate::scheduler::clock::Clock;
use crate::scheduler::evaluator::{should_trigger, TriggerCondition};
use crate::scheduler::oracle::PriceOracle;

/// The single token whose price gates price-based triggers
///
/// Tasks carry a `trigger_token` column, but pricing is not yet routed by
/// it; every price condition is evaluated against this token's quote.
pub const NATIVE_TOKEN: &str = "SOL";

/// Scheduled-task trigger job
///
/// Every tick pulls the full pending set once, takes one shared price
/// sample, evaluates each task and - for each satisfied condition - performs
/// the conditional `pending -> triggered` transition followed by both
/// notification paths. The conditional update is the only synchronization
/// with concurrent API traffic: if a user cancel wins the race, the update
/// matches nothing here and no notification is sent.
pub struct TriggerJob {
    tasks: Arc<dyn TaskRepository>,
    oracle: Arc<PriceOracle>,
    hub: Arc<SseHub>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
}

impl TriggerJob {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        oracle: Arc<PriceOracle>,
        hub: Arc<SseHub>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tasks,
            oracle,
            hub,
            mailer,
            clock,
        }
    }

    /// Run one evaluation pass over all pending tasks
    pub async fn execute_tick(&self) {
        let pending = match self.tasks.list_pending().await {
            Ok(pending) => pending,
            Err(e) => {
                // Treat an unreachable store as an empty batch; the next
                // interval retries with no state to clean up.
                tracing::error!("Trigger tick could not list pending tasks: {}", e);
                return;
            }
        };

        if pending.is_empty() {
            return;
        }

        tracing::debug!("Trigger tick evaluating {} pending task(s)", pending.len());

        // One sample per tick: every price-based task in this batch sees
        // the same value, and the upstream API is hit at most once.
        let price = self.oracle.get(NATIVE_TOKEN).await;
        let now = self.clock.now();

        for entry in &pending {
            if let Err(e) = self.process_task(entry, now, price).await {
                // Isolate the failure: log with the task's identity and
                // keep going with its siblings.
                tracing::error!("Task {} failed during tick: {}", entry.task.id, e);
            }
        }
    }

    /// Evaluate one task and, when its condition holds, trigger and notify
    async fn process_task(
        &self,
        entry: &PendingTask,
        now: DateTime<Utc>,
        price: Option<Decimal>,
    ) -> Result<(), DatabaseError> {
        let task = &entry.task;

        let Some(condition) = TriggerCondition::parse(task) else {
            // Inconsistent trigger fields: never fires, never errors
            tracing::warn!("Task {} has an unparseable trigger, skipping", task.id);
            return Ok(());
        };

        if !should_trigger(&condition, task.created_at, now, price) {
            return Ok(());
        }

        let transitioned = self
            .tasks
            .update_status(task.id, task.user_id, TaskStatus::Pending, TaskStatus::Triggered)
            .await?;

        if !transitioned {
            // Lost the race to a concurrent cancel or an overlapping tick;
            // whoever won owns the outcome, so stay silent.
            tracing::debug!("Task {} changed state under us, skipping notification", task.id);
            return Ok(());
        }

        tracing::info!("Triggered task {}: {}", task.id, task.label);

        // Primary channel: live push to every open session of the owner.
        self.hub.emit(
            task.user_id,
            "task_triggered",
            &serde_json::json!({
                "taskId": task.id,
                "label": task.label,
                "actionType": task.action_type,
                "actionPayload": task.action_payload,
            }),
        );

        // Secondary channel: fire-and-forget email on its own task, so a
        // slow SMTP round trip never delays the rest of the batch.
        let mailer = Arc::clone(&self.mailer);
        let to = entry.owner_email.clone();
        let label = task.label.clone();
        tokio::spawn(async move {
            mailer.send_task_triggered(&to, &label).await;
        });

        Ok(())
    }

    /// Register this job with the scheduler
    ///
    /// Schedule: every minute (0 * * * * *)
    pub async fn register(
        self: Arc<Self>,
        scheduler: &JobScheduler,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let job_ref = Arc::clone(&self);

        let job = Job::new_async("0 * * * * *", move |_uuid, _lock| {
            let job = Arc::clone(&job_ref);

            Box::pin(async move {
                job.execute_tick().await;
            })
        })?;

        scheduler.add(job).await?;

        tracing::info!("Trigger job registered (runs every minute)");

        Ok(())
    }

    /// Run a tick immediately (used at startup so a restart does not wait
    /// out a full interval before the first evaluation)
    pub async fn run_now(&self) {
        self.execute_tick().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::time::Duration;
    use uuid::Uuid;

    use crate::database::enums::TriggerKind;
    use crate::database::models::{NewScheduledTask, ScheduledTask};
    use crate::scheduler::clock::test_support::ManualClock;
    use crate::scheduler::oracle::{PriceFeed, PriceFeedError};

    /// In-memory task store with the same compare-and-set contract as the
    /// real repository: all mutations happen under one lock, so two racing
    /// updates on a row see exactly one success.
    struct InMemoryTaskStore {
        rows: Mutex<Vec<ScheduledTask>>,
        emails: Mutex<HashMap<Uuid, String>>,
        fail_listing: Mutex<bool>,
    }

    impl InMemoryTaskStore {
        fn new() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                emails: Mutex::new(HashMap::new()),
                fail_listing: Mutex::new(false),
            }
        }

        fn insert(&self, task: ScheduledTask, owner_email: &str) {
            self.emails.lock().insert(task.user_id, owner_email.to_string());
            self.rows.lock().push(task);
        }

        fn status_of(&self, id: Uuid) -> TaskStatus {
            self.rows.lock().iter().find(|t| t.id == id).unwrap().status
        }

        fn set_fail_listing(&self, fail: bool) {
            *self.fail_listing.lock() = fail;
        }
    }

    #[async_trait::async_trait]
    impl TaskRepository for InMemoryTaskStore {
        async fn create(&self, new_task: NewScheduledTask) -> Result<ScheduledTask, DatabaseError> {
            let task = ScheduledTask {
                id: new_task.id,
                user_id: new_task.user_id,
                status: new_task.status,
                action_type: new_task.action_type,
                action_payload: new_task.action_payload,
                trigger_type: new_task.trigger_type,
                trigger_at: new_task.trigger_at,
                trigger_token: new_task.trigger_token,
                trigger_price: new_task.trigger_price,
                idle_hours: new_task.idle_hours,
                label: new_task.label,
                created_at: Utc::now(),
            };
            self.rows.lock().push(task.clone());
            Ok(task)
        }

        async fn list_active(&self, user_id: Uuid) -> Result<Vec<ScheduledTask>, DatabaseError> {
            Ok(self
                .rows
                .lock()
                .iter()
                .filter(|t| {
                    t.user_id == user_id
                        && matches!(t.status, TaskStatus::Pending | TaskStatus::Triggered)
                })
                .cloned()
                .collect())
        }

        async fn list_pending(&self) -> Result<Vec<PendingTask>, DatabaseError> {
            if *self.fail_listing.lock() {
                return Err(DatabaseError::ConnectionFailed("store offline".to_string()));
            }

            let emails = self.emails.lock();
            Ok(self
                .rows
                .lock()
                .iter()
                .filter(|t| t.status == TaskStatus::Pending)
                .map(|t| PendingTask {
                    task: t.clone(),
                    owner_email: emails
                        .get(&t.user_id)
                        .cloned()
                        .unwrap_or_else(|| "owner@example.com".to_string()),
                })
                .collect())
        }

        async fn update_status(
            &self,
            id: Uuid,
            user_id: Uuid,
            expected: TaskStatus,
            new_status: TaskStatus,
        ) -> Result<bool, DatabaseError> {
            let mut rows = self.rows.lock();
            for task in rows.iter_mut() {
                if task.id == id && task.user_id == user_id && task.status == expected {
                    task.status = new_status;
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }

    /// Mailer that records every send
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingMailer {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().len()
        }
    }

    #[async_trait::async_trait]
    impl Mailer for RecordingMailer {
        async fn send_task_triggered(&self, to: &str, label: &str) {
            self.sent.lock().push((to.to_string(), label.to_string()));
        }
    }

    /// Price feed serving a settable value, or failing when unset
    struct StaticFeed {
        price: Mutex<Option<Decimal>>,
    }

    impl StaticFeed {
        fn new(price: Option<Decimal>) -> Self {
            Self {
                price: Mutex::new(price),
            }
        }

        fn set(&self, price: Option<Decimal>) {
            *self.price.lock() = price;
        }
    }

    #[async_trait::async_trait]
    impl PriceFeed for StaticFeed {
        async fn fetch_usd_price(&self, _token: &str) -> Result<Decimal, PriceFeedError> {
            let price = *self.price.lock();
            price.ok_or_else(|| PriceFeedError::RequestFailed("feed down".to_string()))
        }
    }

    struct Harness {
        store: Arc<InMemoryTaskStore>,
        feed: Arc<StaticFeed>,
        hub: Arc<SseHub>,
        mailer: Arc<RecordingMailer>,
        clock: Arc<ManualClock>,
        job: TriggerJob,
    }

    fn harness(price: Option<Decimal>, now: DateTime<Utc>) -> Harness {
        let store = Arc::new(InMemoryTaskStore::new());
        let feed = Arc::new(StaticFeed::new(price));
        // Zero TTL so every tick consults the feed's current value
        let oracle = Arc::new(PriceOracle::with_ttl(
            Arc::clone(&feed) as Arc<dyn PriceFeed>,
            Duration::ZERO,
        ));
        let hub = Arc::new(SseHub::new());
        let mailer = Arc::new(RecordingMailer::new());
        let clock = Arc::new(ManualClock::new(now));

        let job = TriggerJob::new(
            Arc::clone(&store) as Arc<dyn TaskRepository>,
            oracle,
            Arc::clone(&hub),
            Arc::clone(&mailer) as Arc<dyn Mailer>,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );

        Harness {
            store,
            feed,
            hub,
            mailer,
            clock,
            job,
        }
    }

    fn price_gte_task(user_id: Uuid, threshold: Decimal, created_at: DateTime<Utc>) -> ScheduledTask {
        ScheduledTask {
            id: Uuid::new_v4(),
            user_id,
            status: TaskStatus::Pending,
            action_type: "swap".to_string(),
            action_payload: Some(serde_json::json!({"amount": "1", "sourceToken": "SOL"})),
            trigger_type: TriggerKind::PriceGte,
            trigger_at: None,
            trigger_token: Some("SOL".to_string()),
            trigger_price: Some(threshold),
            idle_hours: None,
            label: "swap".to_string(),
            created_at,
        }
    }

    fn time_task(user_id: Uuid, at: DateTime<Utc>, created_at: DateTime<Utc>) -> ScheduledTask {
        ScheduledTask {
            id: Uuid::new_v4(),
            user_id,
            status: TaskStatus::Pending,
            action_type: "transfer".to_string(),
            action_payload: None,
            trigger_type: TriggerKind::Time,
            trigger_at: Some(at),
            trigger_token: None,
            trigger_price: None,
            idle_hours: None,
            label: "send 1 SOL".to_string(),
            created_at,
        }
    }

    /// Wait for the fire-and-forget email tasks spawned by a tick
    async fn wait_for_emails(mailer: &RecordingMailer, expected: usize) {
        for _ in 0..200 {
            if mailer.sent_count() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test]
    async fn test_end_to_end_price_scenario() {
        let now = Utc::now();
        let h = harness(Some(dec!(240)), now);
        let user = Uuid::new_v4();

        let task = price_gte_task(user, dec!(250), now - ChronoDuration::hours(1));
        let task_id = task.id;
        h.store.insert(task, "owner@example.com");

        // Three open dashboards for the owner
        let (_g1, mut rx1) = Arc::clone(&h.hub).register_guarded(user);
        let (_g2, mut rx2) = Arc::clone(&h.hub).register_guarded(user);
        let (_g3, mut rx3) = Arc::clone(&h.hub).register_guarded(user);

        // 240 < 250: nothing happens
        h.job.execute_tick().await;
        assert_eq!(h.store.status_of(task_id), TaskStatus::Pending);
        assert_eq!(h.mailer.sent_count(), 0);
        assert!(rx1.try_recv().is_err());

        // 251 >= 250: exactly one transition, one fan-out, one email
        h.feed.set(Some(dec!(251)));
        h.job.execute_tick().await;

        assert_eq!(h.store.status_of(task_id), TaskStatus::Triggered);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
        assert!(rx3.try_recv().is_ok());

        wait_for_emails(&h.mailer, 1).await;
        assert_eq!(h.mailer.sent_count(), 1);
        assert_eq!(h.mailer.sent.lock()[0], ("owner@example.com".to_string(), "swap".to_string()));
    }

    #[tokio::test]
    async fn test_trigger_is_idempotent_across_overlapping_ticks() {
        let now = Utc::now();
        let h = harness(Some(dec!(300)), now);
        let user = Uuid::new_v4();

        let task = price_gte_task(user, dec!(250), now - ChronoDuration::hours(1));
        h.store.insert(task.clone(), "owner@example.com");

        let (_guard, mut rx) = Arc::clone(&h.hub).register_guarded(user);

        // Simulate two ticks that both read the same pending snapshot
        let snapshot = h.store.list_pending().await.unwrap();
        assert_eq!(snapshot.len(), 1);

        h.job
            .process_task(&snapshot[0], now, Some(dec!(300)))
            .await
            .unwrap();
        h.job
            .process_task(&snapshot[0], now, Some(dec!(300)))
            .await
            .unwrap();

        // The second attempt lost the compare-and-set: one row, one event,
        // one email
        assert_eq!(h.store.status_of(task.id), TaskStatus::Triggered);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());

        wait_for_emails(&h.mailer, 1).await;
        assert_eq!(h.mailer.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_wins_race_and_silences_notification() {
        let now = Utc::now();
        let h = harness(Some(dec!(300)), now);
        let user = Uuid::new_v4();

        let task = price_gte_task(user, dec!(250), now - ChronoDuration::hours(1));
        h.store.insert(task.clone(), "owner@example.com");

        let (_guard, mut rx) = Arc::clone(&h.hub).register_guarded(user);

        // The tick reads its snapshot, then the user cancels before the
        // conditional update lands
        let snapshot = h.store.list_pending().await.unwrap();
        let cancelled = h
            .store
            .update_status(task.id, user, TaskStatus::Pending, TaskStatus::Cancelled)
            .await
            .unwrap();
        assert!(cancelled);

        h.job
            .process_task(&snapshot[0], now, Some(dec!(300)))
            .await
            .unwrap();

        // The cancel won: no notification ever, final status cancelled
        assert_eq!(h.store.status_of(task.id), TaskStatus::Cancelled);
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(h.mailer.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_time_task_fires_at_boundary_with_manual_clock() {
        let created = Utc::now();
        let fire_at = created + ChronoDuration::hours(2);
        let h = harness(None, fire_at - ChronoDuration::seconds(1));
        let user = Uuid::new_v4();

        let task = time_task(user, fire_at, created);
        let task_id = task.id;
        h.store.insert(task, "owner@example.com");

        // One second before the deadline: still pending
        h.job.execute_tick().await;
        assert_eq!(h.store.status_of(task_id), TaskStatus::Pending);

        // At the deadline: fires
        h.clock.set(fire_at);
        h.job.execute_tick().await;
        assert_eq!(h.store.status_of(task_id), TaskStatus::Triggered);
    }

    #[tokio::test]
    async fn test_unavailable_price_skips_price_tasks_but_not_time_tasks() {
        let now = Utc::now();
        // Feed down and cache empty: price is None for the whole tick
        let h = harness(None, now);
        let user = Uuid::new_v4();

        let price_task = price_gte_task(user, dec!(1), now - ChronoDuration::hours(1));
        let due_task = time_task(user, now - ChronoDuration::minutes(5), now - ChronoDuration::hours(1));
        let price_task_id = price_task.id;
        let due_task_id = due_task.id;
        h.store.insert(price_task, "owner@example.com");
        h.store.insert(due_task, "owner@example.com");

        h.job.execute_tick().await;

        // Price evaluation was skipped, not failed; the time task still ran
        assert_eq!(h.store.status_of(price_task_id), TaskStatus::Pending);
        assert_eq!(h.store.status_of(due_task_id), TaskStatus::Triggered);
    }

    #[tokio::test]
    async fn test_malformed_task_is_skipped_and_siblings_still_run() {
        let now = Utc::now();
        let h = harness(None, now);
        let user = Uuid::new_v4();

        // Idle task with no idle_hours: unparseable condition
        let mut malformed = time_task(user, now, now - ChronoDuration::hours(1));
        malformed.trigger_type = TriggerKind::Idle;
        malformed.trigger_at = None;
        let malformed_id = malformed.id;

        let due_task = time_task(user, now - ChronoDuration::minutes(1), now - ChronoDuration::hours(1));
        let due_task_id = due_task.id;

        h.store.insert(malformed, "owner@example.com");
        h.store.insert(due_task, "owner@example.com");

        h.job.execute_tick().await;

        assert_eq!(h.store.status_of(malformed_id), TaskStatus::Pending);
        assert_eq!(h.store.status_of(due_task_id), TaskStatus::Triggered);
    }

    #[tokio::test]
    async fn test_store_outage_is_an_empty_tick() {
        let now = Utc::now();
        let h = harness(Some(dec!(300)), now);
        let user = Uuid::new_v4();

        let task = price_gte_task(user, dec!(250), now - ChronoDuration::hours(1));
        let task_id = task.id;
        h.store.insert(task, "owner@example.com");
        h.store.set_fail_listing(true);

        // The tick logs and returns; nothing is evaluated or notified
        h.job.execute_tick().await;
        assert_eq!(h.store.status_of(task_id), TaskStatus::Pending);
        assert_eq!(h.mailer.sent_count(), 0);

        // Next interval, with the store back, the task goes through
        h.store.set_fail_listing(false);
        h.job.execute_tick().await;
        assert_eq!(h.store.status_of(task_id), TaskStatus::Triggered);
    }

    #[tokio::test]
    async fn test_idle_task_fires_after_window() {
        let created = Utc::now();
        let h = harness(None, created + ChronoDuration::hours(23));
        let user = Uuid::new_v4();

        let mut task = time_task(user, created, created);
        task.trigger_type = TriggerKind::Idle;
        task.trigger_at = None;
        task.idle_hours = Some(dec!(24));
        let task_id = task.id;
        h.store.insert(task, "owner@example.com");

        h.job.execute_tick().await;
        assert_eq!(h.store.status_of(task_id), TaskStatus::Pending);

        h.clock.set(created + ChronoDuration::hours(24));
        h.job.execute_tick().await;
        assert_eq!(h.store.status_of(task_id), TaskStatus::Triggered);
    }
}
