//! A card is a <front, back> pair. Only text is used on either face.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::schedule::CardSchedule;

/// The text content of a card, independent of where it is stored. This is the
/// shape that deck files carry; scheduling state never travels with it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardContent {
    pub front: String,
    pub back: String,
}

/// A stored card: content plus ownership and its scheduling state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub deck_id: i64,
    pub user_id: i64,
    pub front: String,
    pub back: String,
    pub schedule: CardSchedule,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn content(&self) -> CardContent {
        CardContent {
            front: self.front.clone(),
            back: self.back.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_content_round_trip() {
        let content = CardContent {
            front: "cześć".to_string(),
            back: "hello".to_string(),
        };

        let json = serde_json::to_string(&content).unwrap();
        let back: CardContent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, content);
    }
}
