pub mod errors;
pub mod models;
pub mod utils;

pub use errors::TarologueError;
pub use models::{CardMetadata, CartomancyType, Deck, Card, JournalEntry, Spread};
