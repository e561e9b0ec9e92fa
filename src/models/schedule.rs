//! Per-card scheduling state and the queue-selection predicates over it.
//!
//! A card's phase is derived from its repetition counter: 0 = new, 1 = the
//! short-term learning phase, 2 or more = long-term review. The predicates here
//! decide which cards belong in today's queues; the transition itself lives in
//! [`super::sm2`].

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Truncates a timestamp to midnight of its day.
pub fn start_of_day(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Midnight of the following day, the exclusive upper bound for "due today".
pub fn start_of_next_day(t: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(t) + Duration::days(1)
}

/// Learning phase derived from the repetition counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardPhase {
    New,
    Learning,
    Review,
}

/// Scheduling state carried by every card.
///
/// `interval_days` is only meaningful once the card has graduated
/// (repetition >= 2); it is stored as 0 before that.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardSchedule {
    pub repetition: i32,
    pub interval_days: i32,
    pub ease: f64,
    pub next_review: DateTime<Utc>,
}

impl CardSchedule {
    pub fn phase(&self) -> CardPhase {
        match self.repetition {
            0 => CardPhase::New,
            1 => CardPhase::Learning,
            _ => CardPhase::Review,
        }
    }

    /// Never graded. `next_review` is ignored for new cards.
    pub fn is_new(&self) -> bool {
        self.repetition == 0
    }

    /// In the learning phase and scheduled before the end of today.
    pub fn is_learning(&self, now: DateTime<Utc>) -> bool {
        self.repetition == 1 && self.next_review < start_of_next_day(now)
    }

    /// Graduated and scheduled before the end of today.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.repetition >= 2 && self.next_review < start_of_next_day(now)
    }

    /// Normalizes an overdue `next_review` forward to today's midnight so the
    /// card surfaces as due today instead of carrying a stale timestamp.
    ///
    /// Idempotent: a card already at or past today's midnight is unchanged.
    pub fn clamp_overdue(&self, now: DateTime<Utc>) -> CardSchedule {
        let today = start_of_day(now);
        let mut clamped = self.clone();
        if clamped.next_review < today {
            clamped.next_review = today;
        }
        clamped
    }
}
