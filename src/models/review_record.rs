//! Immutable record of a single grading event, kept for analytics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Grade;
use super::schedule::CardSchedule;

/// What the user pressed, the quality it mapped to, and the schedule that
/// resulted. Written best-effort after a review; never read back by the
/// scheduler.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub card_id: i64,
    pub grade: Grade,
    pub quality: u8,
    pub repetition: i32,
    pub interval_days: i32,
    pub ease: f64,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewRecord {
    pub fn new(
        card_id: i64,
        grade: Grade,
        outcome: &CardSchedule,
        reviewed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            card_id,
            grade,
            quality: grade.quality(),
            repetition: outcome.repetition,
            interval_days: outcome.interval_days,
            ease: outcome.ease,
            reviewed_at,
        }
    }
}
