//! Database operations for the memory trainer.
//!
//! Handles SQLite initialization, CRUD for users, decks and cards, the three
//! review queues, and the review history log. Scheduling state lives in
//! columns on the `cards` row, so grading is a single-row update.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

use crate::models::schedule::{start_of_day, start_of_next_day};
use crate::models::{
    Card, CardContent, CardSchedule, Deck, DeckOverview, Grade, InvalidGrade, ReviewRecord,
    SchedulerPolicy, User,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("user not found: {0}")]
    UserNotFound(i64),

    #[error("deck not found: {0}")]
    DeckNotFound(i64),

    #[error("card not found: {0}")]
    CardNotFound(i64),

    #[error(transparent)]
    InvalidGrade(#[from] InvalidGrade),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Card counts per phase for one user, across all decks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsOverview {
    pub total_cards: i64,
    pub new_cards: i64,
    pub learning_cards: i64,
    pub review_cards: i64,
    pub due_cards: i64,
}

/// Owns the SQLite connection and the scheduling policy used for fresh cards.
///
/// `Connection` is not `Sync`; callers that share a `Database` across threads
/// wrap it in `Arc<Mutex<_>>`, which also serializes the read-modify-write of
/// concurrent grading requests for the same card.
pub struct Database {
    conn: Connection,
    policy: SchedulerPolicy,
}

fn to_timestamp(t: DateTime<Utc>) -> i64 {
    t.timestamp()
}

fn from_timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

impl Database {
    /// Opens (or creates) the database at `path` with the default policy.
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with_policy(path, SchedulerPolicy::default())
    }

    pub fn open_with_policy(path: &str, policy: SchedulerPolicy) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, policy)
    }

    /// Fresh in-memory database. Used by tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, SchedulerPolicy::default())
    }

    fn from_connection(conn: Connection, policy: SchedulerPolicy) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        init_schema(&conn)?;
        Ok(Self { conn, policy })
    }

    pub fn policy(&self) -> &SchedulerPolicy {
        &self.policy
    }

    // ---- simulated clock ----

    /// Current date as seen by the trainer. Stored in the database so the
    /// clock can be advanced to exercise multi-day scheduling.
    pub fn current_date(&self) -> Result<DateTime<Utc>> {
        let value: String = self.conn.query_row(
            "SELECT value FROM app_state WHERE key = 'current_date'",
            [],
            |row| row.get(0),
        )?;
        Ok(from_timestamp(value.parse::<i64>().unwrap_or(0)))
    }

    /// Advances the stored date by 24 hours and returns the new value.
    pub fn advance_day(&self) -> Result<DateTime<Utc>> {
        let next = self.current_date()? + chrono::Duration::days(1);
        self.conn.execute(
            "UPDATE app_state SET value = ?1 WHERE key = 'current_date'",
            params![to_timestamp(next).to_string()],
        )?;
        Ok(next)
    }

    // ---- users ----

    pub fn create_user(&self, name: &str, email: &str, now: DateTime<Utc>) -> Result<User> {
        self.conn.execute(
            "INSERT INTO users (name, email, created_at) VALUES (?1, ?2, ?3)",
            params![name, email, to_timestamp(now)],
        )?;
        self.get_user(self.conn.last_insert_rowid())
    }

    pub fn get_user(&self, user_id: i64) -> Result<User> {
        self.conn
            .query_row(
                "SELECT id, name, email, created_at FROM users WHERE id = ?1",
                params![user_id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        created_at: from_timestamp(row.get(3)?),
                    })
                },
            )
            .optional()?
            .ok_or(StoreError::UserNotFound(user_id))
    }

    /// Deletes a user; decks, cards and history follow by cascade.
    pub fn delete_user(&self, user_id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
        if changed == 0 {
            return Err(StoreError::UserNotFound(user_id));
        }
        Ok(())
    }

    // ---- decks ----

    pub fn create_deck(
        &self,
        user_id: i64,
        name: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<Deck> {
        self.get_user(user_id)?;
        let ts = to_timestamp(now);
        self.conn.execute(
            "INSERT INTO decks (user_id, name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![user_id, name, description, ts],
        )?;
        self.get_deck(user_id, self.conn.last_insert_rowid())
    }

    pub fn get_deck(&self, user_id: i64, deck_id: i64) -> Result<Deck> {
        self.conn
            .query_row(
                "SELECT id, user_id, name, description, created_at, updated_at
                 FROM decks WHERE id = ?1 AND user_id = ?2",
                params![deck_id, user_id],
                map_deck_row,
            )
            .optional()?
            .ok_or(StoreError::DeckNotFound(deck_id))
    }

    /// All decks of a user with their queue counts, most recently updated
    /// first.
    pub fn list_decks(&self, user_id: i64, now: DateTime<Utc>) -> Result<Vec<DeckOverview>> {
        let tomorrow = to_timestamp(start_of_next_day(now));
        let mut stmt = self.conn.prepare(
            "SELECT d.id, d.user_id, d.name, d.description, d.created_at, d.updated_at,
                    COUNT(c.id),
                    COUNT(CASE WHEN c.repetition = 0 THEN 1 END),
                    COUNT(CASE WHEN c.repetition = 1 AND c.next_review < ?2 THEN 1 END),
                    COUNT(CASE WHEN c.repetition >= 2 AND c.next_review < ?2 THEN 1 END)
             FROM decks d
             LEFT JOIN cards c ON c.deck_id = d.id
             WHERE d.user_id = ?1
             GROUP BY d.id
             ORDER BY d.updated_at DESC, d.id ASC",
        )?;

        let overviews = stmt
            .query_map(params![user_id, tomorrow], |row| {
                Ok(DeckOverview {
                    deck: map_deck_row(row)?,
                    total_cards: row.get(6)?,
                    new_cards: row.get(7)?,
                    learning_cards: row.get(8)?,
                    due_cards: row.get(9)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(overviews)
    }

    pub fn update_deck(
        &self,
        user_id: i64,
        deck_id: i64,
        name: Option<&str>,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Deck> {
        let changed = self.conn.execute(
            "UPDATE decks
             SET name = COALESCE(?1, name),
                 description = COALESCE(?2, description),
                 updated_at = ?3
             WHERE id = ?4 AND user_id = ?5",
            params![name, description, to_timestamp(now), deck_id, user_id],
        )?;
        if changed == 0 {
            return Err(StoreError::DeckNotFound(deck_id));
        }
        self.get_deck(user_id, deck_id)
    }

    /// Deletes a deck; its cards and their history go with it (cascade).
    pub fn delete_deck(&self, user_id: i64, deck_id: i64) -> Result<()> {
        let changed = self.conn.execute(
            "DELETE FROM decks WHERE id = ?1 AND user_id = ?2",
            params![deck_id, user_id],
        )?;
        if changed == 0 {
            return Err(StoreError::DeckNotFound(deck_id));
        }
        Ok(())
    }

    // ---- cards ----

    /// Adds a card to a deck the user owns and gives it a fresh schedule.
    pub fn create_card(
        &self,
        user_id: i64,
        deck_id: i64,
        content: &CardContent,
        now: DateTime<Utc>,
    ) -> Result<Card> {
        self.get_deck(user_id, deck_id)?;
        let schedule = self.policy.initial_schedule(now);
        let ts = to_timestamp(now);
        self.conn.execute(
            "INSERT INTO cards
                 (deck_id, user_id, front, back,
                  repetition, interval_days, ease, next_review, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                deck_id,
                user_id,
                content.front,
                content.back,
                schedule.repetition,
                schedule.interval_days,
                schedule.ease,
                to_timestamp(schedule.next_review),
                ts,
            ],
        )?;
        self.get_card(user_id, self.conn.last_insert_rowid())
    }

    pub fn get_card(&self, user_id: i64, card_id: i64) -> Result<Card> {
        self.conn
            .query_row(
                &format!("{CARD_SELECT} WHERE id = ?1 AND user_id = ?2"),
                params![card_id, user_id],
                map_card_row,
            )
            .optional()?
            .ok_or(StoreError::CardNotFound(card_id))
    }

    pub fn update_card(
        &self,
        user_id: i64,
        card_id: i64,
        front: Option<&str>,
        back: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Card> {
        let changed = self.conn.execute(
            "UPDATE cards
             SET front = COALESCE(?1, front),
                 back = COALESCE(?2, back),
                 updated_at = ?3
             WHERE id = ?4 AND user_id = ?5",
            params![front, back, to_timestamp(now), card_id, user_id],
        )?;
        if changed == 0 {
            return Err(StoreError::CardNotFound(card_id));
        }
        self.get_card(user_id, card_id)
    }

    pub fn delete_card(&self, user_id: i64, card_id: i64) -> Result<()> {
        let changed = self.conn.execute(
            "DELETE FROM cards WHERE id = ?1 AND user_id = ?2",
            params![card_id, user_id],
        )?;
        if changed == 0 {
            return Err(StoreError::CardNotFound(card_id));
        }
        Ok(())
    }

    /// All cards of a deck in insertion order, regardless of schedule.
    pub fn cards_in_deck(&self, user_id: i64, deck_id: i64) -> Result<Vec<Card>> {
        self.get_deck(user_id, deck_id)?;
        let mut stmt = self.conn.prepare(&format!(
            "{CARD_SELECT} WHERE deck_id = ?1 AND user_id = ?2 ORDER BY created_at ASC, id ASC"
        ))?;
        let cards = stmt
            .query_map(params![deck_id, user_id], map_card_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    // ---- review queues ----

    /// Cards never graded, oldest first. `next_review` is not consulted.
    pub fn list_new(
        &self,
        user_id: i64,
        deck_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Card>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CARD_SELECT}
             WHERE user_id = ?1 AND (?2 IS NULL OR deck_id = ?2) AND repetition = 0
             ORDER BY created_at ASC, id ASC
             LIMIT ?3"
        ))?;
        let cards = stmt
            .query_map(params![user_id, deck_id, limit as i64], map_card_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    /// Learning-phase cards scheduled before the end of today.
    pub fn list_learning(
        &self,
        user_id: i64,
        deck_id: Option<i64>,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<Card>> {
        self.list_scheduled("repetition = 1", user_id, deck_id, limit, now)
    }

    /// Graduated cards scheduled before the end of today.
    pub fn list_due(
        &self,
        user_id: i64,
        deck_id: Option<i64>,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<Card>> {
        self.list_scheduled("repetition >= 2", user_id, deck_id, limit, now)
    }

    /// Shared body of the learning/due queues: overdue cards are first clamped
    /// forward to today's midnight (persisted, idempotent), then everything
    /// scheduled before tomorrow is returned, earliest first.
    fn list_scheduled(
        &self,
        phase_predicate: &'static str,
        user_id: i64,
        deck_id: Option<i64>,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<Card>> {
        let today = to_timestamp(start_of_day(now));
        let tomorrow = to_timestamp(start_of_next_day(now));

        self.conn.execute(
            &format!(
                "UPDATE cards SET next_review = ?1
                 WHERE user_id = ?2 AND (?3 IS NULL OR deck_id = ?3)
                   AND {phase_predicate} AND next_review < ?1"
            ),
            params![today, user_id, deck_id],
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "{CARD_SELECT}
             WHERE user_id = ?1 AND (?2 IS NULL OR deck_id = ?2)
               AND {phase_predicate} AND next_review < ?3
             ORDER BY next_review ASC, id ASC
             LIMIT ?4"
        ))?;
        let cards = stmt
            .query_map(params![user_id, deck_id, tomorrow, limit as i64], map_card_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    // ---- scheduling state ----

    pub fn schedule_of(&self, card_id: i64) -> Result<CardSchedule> {
        self.conn
            .query_row(
                "SELECT repetition, interval_days, ease, next_review
                 FROM cards WHERE id = ?1",
                params![card_id],
                |row| {
                    Ok(CardSchedule {
                        repetition: row.get(0)?,
                        interval_days: row.get(1)?,
                        ease: row.get(2)?,
                        next_review: from_timestamp(row.get(3)?),
                    })
                },
            )
            .optional()?
            .ok_or(StoreError::CardNotFound(card_id))
    }

    /// Writes a schedule computed by the scheduler back to the card row.
    pub fn apply_schedule(&self, card_id: i64, schedule: &CardSchedule) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE cards
             SET repetition = ?1, interval_days = ?2, ease = ?3, next_review = ?4,
                 updated_at = strftime('%s', 'now')
             WHERE id = ?5",
            params![
                schedule.repetition,
                schedule.interval_days,
                schedule.ease,
                to_timestamp(schedule.next_review),
                card_id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::CardNotFound(card_id));
        }
        Ok(())
    }

    // ---- review history ----

    pub fn append_history(&self, record: &ReviewRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO review_history
                 (card_id, grade, quality, repetition, interval_days, ease, reviewed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.card_id,
                record.grade.as_number(),
                record.quality,
                record.repetition,
                record.interval_days,
                record.ease,
                to_timestamp(record.reviewed_at),
            ],
        )?;
        Ok(())
    }

    /// Grading history of one card, oldest first.
    pub fn history_for_card(&self, card_id: i64) -> Result<Vec<ReviewRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT card_id, grade, quality, repetition, interval_days, ease, reviewed_at
             FROM review_history WHERE card_id = ?1
             ORDER BY reviewed_at ASC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![card_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, u8>(2)?,
                    row.get::<_, i32>(3)?,
                    row.get::<_, i32>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(card_id, grade, quality, repetition, interval_days, ease, reviewed_at)| {
                Ok(ReviewRecord {
                    card_id,
                    grade: Grade::try_from(grade)?,
                    quality,
                    repetition,
                    interval_days,
                    ease,
                    reviewed_at: from_timestamp(reviewed_at),
                })
            })
            .collect()
    }

    // ---- statistics ----

    pub fn stats_overview(&self, user_id: i64, now: DateTime<Utc>) -> Result<StatsOverview> {
        let tomorrow = to_timestamp(start_of_next_day(now));
        let stats = self.conn.query_row(
            "SELECT COUNT(*),
                    COUNT(CASE WHEN repetition = 0 THEN 1 END),
                    COUNT(CASE WHEN repetition = 1 AND next_review < ?2 THEN 1 END),
                    COUNT(CASE WHEN repetition >= 2 THEN 1 END),
                    COUNT(CASE WHEN repetition >= 2 AND next_review < ?2 THEN 1 END)
             FROM cards WHERE user_id = ?1",
            params![user_id, tomorrow],
            |row| {
                Ok(StatsOverview {
                    total_cards: row.get(0)?,
                    new_cards: row.get(1)?,
                    learning_cards: row.get(2)?,
                    review_cards: row.get(3)?,
                    due_cards: row.get(4)?,
                })
            },
        )?;
        Ok(stats)
    }
}

const CARD_SELECT: &str = "SELECT id, deck_id, user_id, front, back,
        repetition, interval_days, ease, next_review, created_at, updated_at
 FROM cards";

fn map_card_row(row: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        deck_id: row.get(1)?,
        user_id: row.get(2)?,
        front: row.get(3)?,
        back: row.get(4)?,
        schedule: CardSchedule {
            repetition: row.get(5)?,
            interval_days: row.get(6)?,
            ease: row.get(7)?,
            next_review: from_timestamp(row.get(8)?),
        },
        created_at: from_timestamp(row.get(9)?),
        updated_at: from_timestamp(row.get(10)?),
    })
}

fn map_deck_row(row: &Row<'_>) -> rusqlite::Result<Deck> {
    Ok(Deck {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: from_timestamp(row.get(4)?),
        updated_at: from_timestamp(row.get(5)?),
    })
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS decks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            UNIQUE(user_id, name)
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS cards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            deck_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            front TEXT NOT NULL,
            back TEXT NOT NULL,
            repetition INTEGER NOT NULL DEFAULT 0,
            interval_days INTEGER NOT NULL DEFAULT 0,
            ease REAL NOT NULL DEFAULT 2.5,
            next_review INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (deck_id) REFERENCES decks(id) ON DELETE CASCADE,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS review_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            card_id INTEGER NOT NULL,
            grade INTEGER NOT NULL,
            quality INTEGER NOT NULL,
            repetition INTEGER NOT NULL,
            interval_days INTEGER NOT NULL,
            ease REAL NOT NULL,
            reviewed_at INTEGER NOT NULL,
            FOREIGN KEY (card_id) REFERENCES cards(id) ON DELETE CASCADE
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![Utc::now().timestamp().to_string()],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 15, 30, 0).unwrap()
    }

    fn content(front: &str, back: &str) -> CardContent {
        CardContent {
            front: front.to_string(),
            back: back.to_string(),
        }
    }

    /// Database seeded with one user and one deck.
    fn seeded() -> (Database, i64, i64) {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user("Ola", "ola@example.com", now()).unwrap();
        let deck = db
            .create_deck(user.id, "Polish Vocabulary", "", now())
            .unwrap();
        (db, user.id, deck.id)
    }

    #[test]
    fn test_create_card_gets_fresh_schedule() {
        let (db, user, deck) = seeded();
        let card = db
            .create_card(user, deck, &content("cześć", "hello"), now())
            .unwrap();

        assert_eq!(card.front, "cześć");
        assert_eq!(card.schedule.repetition, 0);
        assert_eq!(card.schedule.interval_days, 0);
        assert_eq!(card.schedule.ease, 2.5);
        assert_eq!(card.schedule.next_review, now() + Duration::days(1));
    }

    #[test]
    fn test_card_crud() {
        let (db, user, deck) = seeded();
        let card = db
            .create_card(user, deck, &content("dziękuję", "thank you"), now())
            .unwrap();

        let updated = db
            .update_card(user, card.id, None, Some("thanks"), now())
            .unwrap();
        assert_eq!(updated.front, "dziękuję");
        assert_eq!(updated.back, "thanks");

        db.delete_card(user, card.id).unwrap();
        assert!(matches!(
            db.get_card(user, card.id),
            Err(StoreError::CardNotFound(_))
        ));
    }

    #[test]
    fn test_update_deck_keeps_unset_fields() {
        let (db, user, deck) = seeded();
        let renamed = db
            .update_deck(user, deck, Some("Polish B1"), None, now())
            .unwrap();
        assert_eq!(renamed.name, "Polish B1");
        assert_eq!(renamed.description, "");

        assert!(matches!(
            db.update_deck(user, 999, Some("x"), None, now()),
            Err(StoreError::DeckNotFound(999))
        ));
    }

    #[test]
    fn test_cards_are_scoped_to_their_owner() {
        let (db, user, deck) = seeded();
        let other = db.create_user("Jan", "jan@example.com", now()).unwrap();
        let card = db
            .create_card(user, deck, &content("proszę", "please"), now())
            .unwrap();

        assert!(matches!(
            db.get_card(other.id, card.id),
            Err(StoreError::CardNotFound(_))
        ));
        assert!(db.list_new(other.id, None, 50).unwrap().is_empty());
    }

    #[test]
    fn test_deck_delete_cascades_to_cards_and_history() {
        let (db, user, deck) = seeded();
        let card = db
            .create_card(user, deck, &content("tak", "yes"), now())
            .unwrap();
        let outcome = db.policy().initial_schedule(now());
        db.append_history(&ReviewRecord::new(card.id, Grade::Good, &outcome, now()))
            .unwrap();

        db.delete_deck(user, deck).unwrap();

        assert!(matches!(
            db.get_card(user, card.id),
            Err(StoreError::CardNotFound(_))
        ));
        assert!(db.history_for_card(card.id).unwrap().is_empty());
    }

    #[test]
    fn test_user_delete_cascades_through_decks_and_cards() {
        let (db, user, deck) = seeded();
        let card = db
            .create_card(user, deck, &content("nie", "no"), now())
            .unwrap();

        db.delete_user(user).unwrap();

        assert!(matches!(db.get_user(user), Err(StoreError::UserNotFound(_))));
        assert!(matches!(
            db.schedule_of(card.id),
            Err(StoreError::CardNotFound(_))
        ));
    }

    #[test]
    fn test_new_queue_only_holds_ungraded_cards() {
        let (db, user, deck) = seeded();
        let a = db.create_card(user, deck, &content("a", "1"), now()).unwrap();
        let b = db.create_card(user, deck, &content("b", "2"), now()).unwrap();

        // Graduate one card out of the new queue.
        let graduated = CardSchedule {
            repetition: 2,
            interval_days: 2,
            ease: 2.5,
            next_review: now() + Duration::days(2),
        };
        db.apply_schedule(a.id, &graduated).unwrap();

        let new = db.list_new(user, Some(deck), 50).unwrap();
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].id, b.id);
    }

    #[test]
    fn test_due_queue_orders_by_next_review_then_id() {
        let (db, user, deck) = seeded();
        let mut ids = Vec::new();
        for (front, days_ago) in [("x", 0), ("y", 3), ("z", 3)] {
            let card = db
                .create_card(user, deck, &content(front, front), now())
                .unwrap();
            db.apply_schedule(
                card.id,
                &CardSchedule {
                    repetition: 2,
                    interval_days: 1,
                    ease: 2.5,
                    next_review: start_of_day(now()) - Duration::days(days_ago),
                },
            )
            .unwrap();
            ids.push(card.id);
        }

        let due = db.list_due(user, Some(deck), 50, now()).unwrap();
        // The two overdue cards clamp to the same instant and fall back to
        // insertion order; the card already scheduled today comes after them
        // only by id.
        assert_eq!(due.len(), 3);
        assert_eq!(
            due.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![ids[0], ids[1], ids[2]]
        );
        for card in &due {
            assert!(card.schedule.next_review >= start_of_day(now()));
        }
    }

    #[test]
    fn test_overdue_clamp_is_persisted_and_idempotent() {
        let (db, user, deck) = seeded();
        let card = db.create_card(user, deck, &content("q", "a"), now()).unwrap();
        db.apply_schedule(
            card.id,
            &CardSchedule {
                repetition: 3,
                interval_days: 5,
                ease: 2.2,
                next_review: now() - Duration::days(30),
            },
        )
        .unwrap();

        db.list_due(user, None, 50, now()).unwrap();
        let first = db.schedule_of(card.id).unwrap();
        assert_eq!(first.next_review, start_of_day(now()));

        db.list_due(user, None, 50, now()).unwrap();
        assert_eq!(db.schedule_of(card.id).unwrap(), first);
    }

    #[test]
    fn test_learning_queue_excludes_tomorrow() {
        let (db, user, deck) = seeded();
        let today_card = db.create_card(user, deck, &content("a", "1"), now()).unwrap();
        let tomorrow_card = db.create_card(user, deck, &content("b", "2"), now()).unwrap();

        db.apply_schedule(
            today_card.id,
            &CardSchedule {
                repetition: 1,
                interval_days: 1,
                ease: 2.3,
                next_review: now(),
            },
        )
        .unwrap();
        db.apply_schedule(
            tomorrow_card.id,
            &CardSchedule {
                repetition: 1,
                interval_days: 1,
                ease: 2.3,
                next_review: start_of_next_day(now()),
            },
        )
        .unwrap();

        let learning = db.list_learning(user, None, 50, now()).unwrap();
        assert_eq!(learning.len(), 1);
        assert_eq!(learning[0].id, today_card.id);
    }

    #[test]
    fn test_queue_limit() {
        let (db, user, deck) = seeded();
        for i in 0..5 {
            db.create_card(user, deck, &content(&format!("c{i}"), "x"), now())
                .unwrap();
        }
        assert_eq!(db.list_new(user, None, 3).unwrap().len(), 3);
    }

    #[test]
    fn test_history_round_trip() {
        let (db, user, deck) = seeded();
        let card = db.create_card(user, deck, &content("q", "a"), now()).unwrap();
        let outcome = CardSchedule {
            repetition: 2,
            interval_days: 2,
            ease: 2.5,
            next_review: start_of_day(now()) + Duration::days(2),
        };
        db.append_history(&ReviewRecord::new(card.id, Grade::Good, &outcome, now()))
            .unwrap();

        let history = db.history_for_card(card.id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].grade, Grade::Good);
        assert_eq!(history[0].quality, 4);
        assert_eq!(history[0].repetition, 2);
    }

    #[test]
    fn test_deck_overview_counts() {
        let (db, user, deck) = seeded();
        db.create_card(user, deck, &content("new", "n"), now()).unwrap();
        let due = db.create_card(user, deck, &content("due", "d"), now()).unwrap();
        db.apply_schedule(
            due.id,
            &CardSchedule {
                repetition: 2,
                interval_days: 1,
                ease: 2.5,
                next_review: start_of_day(now()),
            },
        )
        .unwrap();

        let overviews = db.list_decks(user, now()).unwrap();
        assert_eq!(overviews.len(), 1);
        assert_eq!(overviews[0].total_cards, 2);
        assert_eq!(overviews[0].new_cards, 1);
        assert_eq!(overviews[0].learning_cards, 0);
        assert_eq!(overviews[0].due_cards, 1);
    }

    #[test]
    fn test_stats_overview() {
        let (db, user, deck) = seeded();
        db.create_card(user, deck, &content("new", "n"), now()).unwrap();
        let learning = db.create_card(user, deck, &content("l", "l"), now()).unwrap();
        db.apply_schedule(
            learning.id,
            &CardSchedule {
                repetition: 1,
                interval_days: 1,
                ease: 2.3,
                next_review: now(),
            },
        )
        .unwrap();
        let future = db.create_card(user, deck, &content("f", "f"), now()).unwrap();
        db.apply_schedule(
            future.id,
            &CardSchedule {
                repetition: 4,
                interval_days: 30,
                ease: 2.5,
                next_review: now() + Duration::days(30),
            },
        )
        .unwrap();

        let stats = db.stats_overview(user, now()).unwrap();
        assert_eq!(
            stats,
            StatsOverview {
                total_cards: 3,
                new_cards: 1,
                learning_cards: 1,
                review_cards: 1,
                due_cards: 0,
            }
        );
    }

    #[test]
    fn test_advance_day() {
        let db = Database::open_in_memory().unwrap();
        let before = db.current_date().unwrap();
        let after = db.advance_day().unwrap();
        assert_eq!(after - before, Duration::days(1));
        assert_eq!(db.current_date().unwrap(), after);
    }

    #[test]
    fn test_open_creates_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trainer.sqlite3");
        let db = Database::open(path.to_str().unwrap()).unwrap();
        db.create_user("Ola", "ola@example.com", now()).unwrap();
        drop(db);

        let reopened = Database::open(path.to_str().unwrap()).unwrap();
        assert_eq!(reopened.get_user(1).unwrap().name, "Ola");
    }
}
