//! A deck groups the cards of one user under a name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deck {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A deck together with its queue counts, as shown in deck listings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeckOverview {
    pub deck: Deck,
    pub total_cards: i64,
    pub new_cards: i64,
    pub learning_cards: i64,
    pub due_cards: i64,
}
