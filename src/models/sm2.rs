//! Spaced repetition scheduling built on the SM-2 easiness update.
//!
//! Cards move through three phases driven by the four grading buttons:
//! - Again lapses the card back to the learning phase and retries it immediately
//! - Hard/Good/Easy graduate a new or learning card with a fixed interval
//! - In the review phase intervals grow multiplicatively with the ease factor
//! - The ease factor adjusts after each grading and never falls below 1.3
//! - Non-immediate due dates are anchored to midnight, so the hour a card is
//!   reviewed at has no effect on interval arithmetic

use chrono::{DateTime, Duration, Utc};

use super::Grade;
use super::schedule::{CardSchedule, start_of_day};

/// Tunable scheduling constants. These are policy, not law: the values below
/// are what the application ships with, gathered in one place.
#[derive(Clone, Debug)]
pub struct SchedulerPolicy {
    /// Ease factor assigned to a freshly created card.
    pub default_ease: f64,
    /// Lower bound the ease factor can never cross.
    pub min_ease: f64,
    /// Flat ease deduction applied on a lapse.
    pub lapse_ease_penalty: f64,
    /// Interval a lapsed card restarts with.
    pub lapse_interval_days: i32,
    /// Graduating interval when leaving New/Learning with Hard.
    pub graduating_hard_days: i32,
    /// Graduating interval when leaving New/Learning with Good.
    pub graduating_good_days: i32,
    /// Graduating interval when leaving New/Learning with Easy.
    pub graduating_easy_days: i32,
    /// Interval growth for Hard in the review phase.
    pub hard_multiplier: f64,
    /// Extra growth applied on top of the ease factor for Easy.
    pub easy_bonus: f64,
}

impl Default for SchedulerPolicy {
    fn default() -> Self {
        Self {
            default_ease: 2.5,
            min_ease: 1.3,
            lapse_ease_penalty: 0.2,
            lapse_interval_days: 1,
            graduating_hard_days: 1,
            graduating_good_days: 2,
            graduating_easy_days: 4,
            hard_multiplier: 1.2,
            easy_bonus: 1.5,
        }
    }
}

impl SchedulerPolicy {
    /// State assigned to a card when it is first added: never graded, default
    /// ease, scheduled one day out. The interval stays 0 until the card
    /// graduates.
    pub fn initial_schedule(&self, created_at: DateTime<Utc>) -> CardSchedule {
        CardSchedule {
            repetition: 0,
            interval_days: 0,
            ease: self.default_ease,
            next_review: created_at + Duration::days(1),
        }
    }
}

/// Computes the schedule that follows grading `current` with `grade` at `now`.
///
/// Pure transformation: the caller persists the result. Total over the four
/// grades; an out-of-range grade cannot reach this function because [`Grade`]
/// is a closed enum validated at the boundary.
pub fn schedule(
    policy: &SchedulerPolicy,
    current: &CardSchedule,
    grade: Grade,
    now: DateTime<Utc>,
) -> CardSchedule {
    let today = start_of_day(now);

    if grade == Grade::Again {
        // Lapse: back to learning, re-presented within the same session.
        return CardSchedule {
            repetition: 1,
            interval_days: policy.lapse_interval_days,
            ease: round_ease((current.ease - policy.lapse_ease_penalty).max(policy.min_ease)),
            next_review: now,
        };
    }

    let ease = next_ease(policy, current.ease, grade.quality());

    if current.repetition <= 1 {
        // Graduation out of New/Learning: the interval is fixed per grade, the
        // ease still gets its SM-2 update for continuity.
        let days = if grade == Grade::Hard {
            policy.graduating_hard_days
        } else if grade == Grade::Good {
            policy.graduating_good_days
        } else {
            policy.graduating_easy_days
        };

        return CardSchedule {
            repetition: 2,
            interval_days: days,
            ease,
            next_review: today + Duration::days(i64::from(days)),
        };
    }

    // Review phase: grow the previous interval.
    let previous = f64::from(current.interval_days.max(1));
    let grown = if grade == Grade::Hard {
        previous * policy.hard_multiplier
    } else if grade == Grade::Good {
        previous * ease
    } else {
        previous * ease * policy.easy_bonus
    };
    let days = (grown.round() as i32).max(1);

    CardSchedule {
        repetition: current.repetition + 1,
        interval_days: days,
        ease,
        next_review: today + Duration::days(i64::from(days)),
    }
}

/// SM-2 easiness update: EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)),
/// floored at the policy minimum and rounded to two decimals.
fn next_ease(policy: &SchedulerPolicy, ease: f64, quality: u8) -> f64 {
    let q = f64::from(quality);
    let updated = ease + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02));
    round_ease(updated.max(policy.min_ease))
}

fn round_ease(ease: f64) -> f64 {
    (ease * 100.0).round() / 100.0
}
