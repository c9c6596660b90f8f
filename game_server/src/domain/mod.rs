// Domain layer: the pure Game Room state machine and its supporting types.

pub mod board;
pub mod card;
pub mod errors;
pub mod ports;
pub mod room;

pub use board::{Board, BoardError};
pub use card::CardPair;
pub use errors::{FlipError, JoinError, StartGameError};
pub use ports::{CardSource, CardSourceError};
pub use room::{
    CardsMatchedOutcome, FlipOutcome, GameEndOutcome, GameReadyOutcome, JoinOutcome, Room,
    RoomStatus, TickOutcome, TurnSwitchOutcome, Winner,
};
