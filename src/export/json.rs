//! JSON import/export of flashcard decks.
//!
//! A deck file carries the deck name, description and card faces only.
//! Scheduling state deliberately stays behind: imported cards start out as
//! new cards, exactly as if they had just been added.

use std::fs::File;
use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::db::{Database, StoreError};
use crate::models::{CardContent, Deck};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// On-disk shape of an exported deck.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeckFile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cards: Vec<CardContent>,
}

/// Writes a user's deck and its cards to a JSON file at `path`.
pub fn export_deck_to_path(
    db: &Database,
    user_id: i64,
    deck_id: i64,
    path: &str,
) -> Result<(), ExportError> {
    let deck = db.get_deck(user_id, deck_id)?;
    let cards = db
        .cards_in_deck(user_id, deck_id)?
        .iter()
        .map(|card| card.content())
        .collect();

    let deck_file = DeckFile {
        name: deck.name,
        description: deck.description,
        cards,
    };

    let json_string = serde_json::to_string_pretty(&deck_file)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

/// Imports a deck file, creating the deck and its cards for `user_id`.
/// Every imported card gets a fresh schedule dated `now`.
pub fn import_deck_from_path(
    db: &Database,
    user_id: i64,
    path: &str,
    now: DateTime<Utc>,
) -> Result<Deck, ExportError> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let deck_file: DeckFile = serde_json::from_str(&contents)?;

    let deck = db.create_deck(user_id, &deck_file.name, &deck_file.description, now)?;
    for card in &deck_file.cards {
        db.create_card(user_id, deck.id, card, now)?;
    }

    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 15, 30, 0).unwrap()
    }

    fn seeded_deck(db: &Database) -> (i64, i64) {
        let user = db.create_user("Ola", "ola@example.com", now()).unwrap();
        let deck = db
            .create_deck(user.id, "Polish Vocabulary", "everyday words", now())
            .unwrap();
        for (front, back) in [("cześć", "hello"), ("do widzenia", "goodbye")] {
            db.create_card(
                user.id,
                deck.id,
                &CardContent {
                    front: front.to_string(),
                    back: back.to_string(),
                },
                now(),
            )
            .unwrap();
        }
        (user.id, deck.id)
    }

    #[test]
    fn test_export_writes_deck_file() {
        let db = Database::open_in_memory().unwrap();
        let (user, deck) = seeded_deck(&db);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        export_deck_to_path(&db, user, deck, path.to_str().unwrap()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let deck_file: DeckFile = serde_json::from_str(&contents).unwrap();
        assert_eq!(deck_file.name, "Polish Vocabulary");
        assert_eq!(deck_file.cards.len(), 2);
        assert_eq!(deck_file.cards[0].front, "cześć");
    }

    #[test]
    fn test_export_and_import_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let (user, deck) = seeded_deck(&db);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.json");

        export_deck_to_path(&db, user, deck, path.to_str().unwrap()).unwrap();

        // Import for a different user: content carries over, schedules are new.
        let other = db.create_user("Jan", "jan@example.com", now()).unwrap();
        let imported =
            import_deck_from_path(&db, other.id, path.to_str().unwrap(), now()).unwrap();
        assert_eq!(imported.name, "Polish Vocabulary");

        let cards = db.cards_in_deck(other.id, imported.id).unwrap();
        assert_eq!(cards.len(), 2);
        for card in &cards {
            assert_eq!(card.schedule.repetition, 0);
        }
    }

    #[test]
    fn test_import_nonexistent_file() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user("Ola", "ola@example.com", now()).unwrap();
        let result = import_deck_from_path(&db, user.id, "nonexistent_xyz123.json", now());
        assert!(matches!(result, Err(ExportError::Io(_))));
    }

    #[test]
    fn test_import_invalid_json() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user("Ola", "ola@example.com", now()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        let result = import_deck_from_path(&db, user.id, path.to_str().unwrap(), now());
        assert!(matches!(result, Err(ExportError::Json(_))));
    }
}
