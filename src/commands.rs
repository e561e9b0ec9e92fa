//! Command handling for the trainer binary.

use clap::{Parser, Subcommand, ValueEnum};

use trainer_app::database::db::Database;
use trainer_app::export::json::{export_deck_to_path, import_deck_from_path};
use trainer_app::models::{Card, CardContent, Grade};
use trainer_app::review::ReviewService;

#[derive(Parser)]
#[command(name = "trainer", about = "Flashcard memory trainer", version)]
pub struct Cli {
    /// Path to the SQLite database
    #[arg(long, global = true, default_value = "db.sqlite3")]
    pub db: String,

    /// Acting user id
    #[arg(long, global = true, default_value_t = 1)]
    pub user: i64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage decks
    #[command(subcommand)]
    Deck(DeckCommand),

    /// Manage cards
    #[command(subcommand)]
    Card(CardCommand),

    /// List one of today's review queues
    Queue {
        #[arg(value_enum)]
        which: QueueKind,
        /// Restrict to a single deck
        #[arg(long)]
        deck: Option<i64>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },

    /// Grade a card: 1 = again, 2 = hard, 3 = good, 4 = easy
    Review { card_id: i64, grade: i64 },

    /// Collection statistics
    Stats,

    /// Export a deck to a JSON file
    Export { deck_id: i64, path: String },

    /// Import a deck from a JSON file
    Import { path: String },

    /// Advance the simulated date by one day
    AdvanceDay,
}

#[derive(Subcommand)]
pub enum DeckCommand {
    /// Create a new deck
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List decks with their queue counts
    List,
    /// Delete a deck and all of its cards
    Rm { deck_id: i64 },
}

#[derive(Subcommand)]
pub enum CardCommand {
    /// Add a card to a deck
    Add {
        deck_id: i64,
        front: String,
        back: String,
    },
    /// List all cards in a deck
    List { deck_id: i64 },
    /// Delete a card
    Rm { card_id: i64 },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum QueueKind {
    New,
    Learn,
    Due,
}

pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open(&cli.db)?;
    seed_if_empty(&db, cli.user)?;
    let now = db.current_date()?;

    match cli.command {
        Command::Deck(DeckCommand::Add { name, description }) => {
            let deck = db.create_deck(cli.user, &name, &description, now)?;
            println!("Deck '{}' created (id {}).", deck.name, deck.id);
        }
        Command::Deck(DeckCommand::List) => {
            for overview in db.list_decks(cli.user, now)? {
                println!(
                    "[{}] {}: {} cards ({} new, {} learning, {} due)",
                    overview.deck.id,
                    overview.deck.name,
                    overview.total_cards,
                    overview.new_cards,
                    overview.learning_cards,
                    overview.due_cards,
                );
            }
        }
        Command::Deck(DeckCommand::Rm { deck_id }) => {
            db.delete_deck(cli.user, deck_id)?;
            println!("Deck {deck_id} deleted.");
        }
        Command::Card(CardCommand::Add {
            deck_id,
            front,
            back,
        }) => {
            let card = db.create_card(cli.user, deck_id, &CardContent { front, back }, now)?;
            println!("Card {} added to deck {}.", card.id, deck_id);
        }
        Command::Card(CardCommand::List { deck_id }) => {
            for card in db.cards_in_deck(cli.user, deck_id)? {
                print_card(&card);
            }
        }
        Command::Card(CardCommand::Rm { card_id }) => {
            db.delete_card(cli.user, card_id)?;
            println!("Card {card_id} deleted.");
        }
        Command::Queue { which, deck, limit } => {
            let cards = match which {
                QueueKind::New => db.list_new(cli.user, deck, limit)?,
                QueueKind::Learn => db.list_learning(cli.user, deck, limit, now)?,
                QueueKind::Due => db.list_due(cli.user, deck, limit, now)?,
            };
            if cards.is_empty() {
                println!("Queue is empty.");
            }
            for card in cards {
                print_card(&card);
            }
        }
        Command::Review { card_id, grade } => {
            // Ownership check before the unscoped schedule update.
            db.get_card(cli.user, card_id)?;
            let grade = Grade::try_from(grade)?;

            let service = ReviewService::with_policy(&db, db.policy().clone());
            let next = service.grade(card_id, grade, now)?;
            println!(
                "Card {}: repetition {}, interval {} days, ease {:.2}, next review {}.",
                card_id,
                next.repetition,
                next.interval_days,
                next.ease,
                next.next_review.format("%Y-%m-%d"),
            );
        }
        Command::Stats => {
            let stats = db.stats_overview(cli.user, now)?;
            println!("Total cards:    {}", stats.total_cards);
            println!("New:            {}", stats.new_cards);
            println!("Learning today: {}", stats.learning_cards);
            println!("In review:      {}", stats.review_cards);
            println!("Due today:      {}", stats.due_cards);
        }
        Command::Export { deck_id, path } => {
            export_deck_to_path(&db, cli.user, deck_id, &path)?;
            println!("Deck {deck_id} exported to '{path}'.");
        }
        Command::Import { path } => {
            let deck = import_deck_from_path(&db, cli.user, &path, now)?;
            println!("Deck '{}' imported from '{}' (id {}).", deck.name, path, deck.id);
        }
        Command::AdvanceDay => {
            let date = db.advance_day()?;
            println!("Current date is now {}.", date.format("%Y-%m-%d"));
        }
    }

    Ok(())
}

fn print_card(card: &Card) {
    println!(
        "[{}] {} / {} (repetition {}, next review {})",
        card.id,
        card.front,
        card.back,
        card.schedule.repetition,
        card.schedule.next_review.format("%Y-%m-%d"),
    );
}

/// First run against an empty database: create the default user and a small
/// sample deck to play with. Explicitly selected users are never invented.
fn seed_if_empty(db: &Database, user_id: i64) -> Result<(), Box<dyn std::error::Error>> {
    if user_id != 1 || db.get_user(user_id).is_ok() {
        return Ok(());
    }

    let now = db.current_date()?;
    let user = db.create_user("Student", "student@example.com", now)?;
    let deck = db.create_deck(user.id, "Polish Vocabulary", "starter deck", now)?;
    for (front, back) in [
        ("cześć", "hello"),
        ("dziękuję", "thank you"),
        ("proszę", "please"),
    ] {
        db.create_card(
            user.id,
            deck.id,
            &CardContent {
                front: front.to_string(),
                back: back.to_string(),
            },
            now,
        )?;
    }
    println!("Sample data created (user {}).", user.id);

    Ok(())
}
