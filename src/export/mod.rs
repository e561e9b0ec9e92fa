pub mod json;

pub use json::{DeckFile, ExportError};
