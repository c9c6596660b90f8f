//! Domain-level errors for room transitions. None of these escape to the
//! websocket handler as panics (spec §7): each maps to a log line, a
//! structured `error` event, or a silent drop depending on the call site.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    /// Both slots are already bound to other usernames.
    RoomFull,
    /// This username already occupies a slot whose socket is still live.
    DuplicateConnection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartGameError {
    /// `loopRunning` guard: `startGame` was already called for this room.
    AlreadyStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipError {
    NotRunning,
    OutOfRange,
    NotYourTurn,
    AlreadyPaired,
    /// `cardIndex == flippedIndex`: flipping the same card twice in a row.
    SameCardTwice,
}
