pub mod database;
pub mod export;
pub mod models;
pub mod review;

pub use database::Database;
pub use models::{Card, CardContent, CardSchedule, Deck, Grade, SchedulerPolicy};
pub use review::{ReviewService, ScheduleStore};
