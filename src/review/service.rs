//! The review flow: load a card's scheduling state, run the scheduler,
//! persist the outcome, and append a best-effort history record.

use chrono::{DateTime, Utc};

use crate::database::db::{Database, Result};
use crate::models::{CardSchedule, Grade, ReviewRecord, SchedulerPolicy, sm2};

/// Storage seam the review service is built against. Implemented by
/// [`Database`]; tests substitute their own to exercise failure paths.
pub trait ScheduleStore {
    fn schedule_of(&self, card_id: i64) -> Result<CardSchedule>;
    fn apply_schedule(&self, card_id: i64, schedule: &CardSchedule) -> Result<()>;
    fn append_history(&self, record: &ReviewRecord) -> Result<()>;
}

impl ScheduleStore for Database {
    fn schedule_of(&self, card_id: i64) -> Result<CardSchedule> {
        Database::schedule_of(self, card_id)
    }

    fn apply_schedule(&self, card_id: i64, schedule: &CardSchedule) -> Result<()> {
        Database::apply_schedule(self, card_id, schedule)
    }

    fn append_history(&self, record: &ReviewRecord) -> Result<()> {
        Database::append_history(self, record)
    }
}

impl<S: ScheduleStore + ?Sized> ScheduleStore for &S {
    fn schedule_of(&self, card_id: i64) -> Result<CardSchedule> {
        (**self).schedule_of(card_id)
    }

    fn apply_schedule(&self, card_id: i64, schedule: &CardSchedule) -> Result<()> {
        (**self).apply_schedule(card_id, schedule)
    }

    fn append_history(&self, record: &ReviewRecord) -> Result<()> {
        (**self).append_history(record)
    }
}

/// Applies gradings to cards through an injected store.
///
/// The store serializes concurrent gradings of the same card (the rusqlite
/// store does so by exclusive connection access); the service itself holds no
/// shared mutable state.
pub struct ReviewService<S> {
    store: S,
    policy: SchedulerPolicy,
}

impl<S: ScheduleStore> ReviewService<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, SchedulerPolicy::default())
    }

    pub fn with_policy(store: S, policy: SchedulerPolicy) -> Self {
        Self { store, policy }
    }

    /// Grades a card and returns its new schedule.
    ///
    /// The history append is a side channel: when it fails the failure is
    /// logged and the already-persisted schedule is still returned.
    pub fn grade(&self, card_id: i64, grade: Grade, now: DateTime<Utc>) -> Result<CardSchedule> {
        let current = self.store.schedule_of(card_id)?;
        let next = sm2::schedule(&self.policy, &current, grade, now);
        self.store.apply_schedule(card_id, &next)?;

        let record = ReviewRecord::new(card_id, grade, &next, now);
        if let Err(err) = self.store.append_history(&record) {
            log::warn!("review history append failed for card {card_id}: {err}");
        }

        Ok(next)
    }
}
