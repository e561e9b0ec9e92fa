pub mod card;
pub mod deck;
pub mod grade;
pub mod review_record;
pub mod schedule;
pub mod sm2;
pub mod user;

pub use card::{Card, CardContent};
pub use deck::{Deck, DeckOverview};
pub use grade::{Grade, InvalidGrade};
pub use review_record::ReviewRecord;
pub use schedule::{CardPhase, CardSchedule};
pub use sm2::SchedulerPolicy;
pub use user::User;
