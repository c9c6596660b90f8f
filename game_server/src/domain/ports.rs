//! Seam between the pure board logic and wherever the card catalog actually
//! lives (a flat file, out of scope per spec §1). Synchronous: loading the
//! catalog is not performance-sensitive and keeps `Room::start_game` free
//! of async.

use crate::domain::card::CardPair;

#[derive(Debug)]
pub enum CardSourceError {
    Unavailable(String),
    TooFewPairs { found: usize, required: usize },
}

pub trait CardSource: Send + Sync {
    fn catalog(&self) -> Result<Vec<CardPair>, CardSourceError>;
}
