pub mod db;

pub use db::{Database, StatsOverview, StoreError};
