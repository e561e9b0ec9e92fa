//! User-facing review grades and their mapping onto the SM-2 quality scale.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four grading buttons shown after a card is revealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    /// Failed recall. The card lapses back into the learning phase.
    Again = 1,
    /// Recalled with serious difficulty.
    Hard = 2,
    /// Recalled with some hesitation.
    Good = 3,
    /// Recalled effortlessly.
    Easy = 4,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("grade must be 1 (again), 2 (hard), 3 (good) or 4 (easy), got {0}")]
pub struct InvalidGrade(pub i64);

impl Grade {
    /// SM-2 quality used by the ease-factor update formula.
    pub fn quality(self) -> u8 {
        match self {
            Grade::Again => 0,
            Grade::Hard => 3,
            Grade::Good => 4,
            Grade::Easy => 5,
        }
    }

    pub fn as_number(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for Grade {
    type Error = InvalidGrade;

    fn try_from(value: i64) -> Result<Self, InvalidGrade> {
        match value {
            1 => Ok(Grade::Again),
            2 => Ok(Grade::Hard),
            3 => Ok(Grade::Good),
            4 => Ok(Grade::Easy),
            other => Err(InvalidGrade(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_mapping() {
        assert_eq!(Grade::Again.quality(), 0);
        assert_eq!(Grade::Hard.quality(), 3);
        assert_eq!(Grade::Good.quality(), 4);
        assert_eq!(Grade::Easy.quality(), 5);
    }

    #[test]
    fn test_parse_valid_grades() {
        assert_eq!(Grade::try_from(1), Ok(Grade::Again));
        assert_eq!(Grade::try_from(2), Ok(Grade::Hard));
        assert_eq!(Grade::try_from(3), Ok(Grade::Good));
        assert_eq!(Grade::try_from(4), Ok(Grade::Easy));
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(Grade::try_from(0), Err(InvalidGrade(0)));
        assert_eq!(Grade::try_from(5), Err(InvalidGrade(5)));
        assert_eq!(Grade::try_from(-1), Err(InvalidGrade(-1)));
    }

    #[test]
    fn test_round_trips_through_number() {
        for grade in [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy] {
            assert_eq!(Grade::try_from(grade.as_number()), Ok(grade));
        }
    }
}
