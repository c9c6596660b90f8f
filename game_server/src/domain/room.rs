//! The per-room state machine (spec §3–4.5). Pure state and transitions:
//! no sockets, no locks, no async. The use-case layer wraps a `Room` in a
//! mutex, drives its tick loop, and turns the `*Outcome` values returned
//! here into wire events sent through the connection hub.

use std::cmp::Ordering;

use rand::Rng;

use crate::domain::board::Board;
use crate::domain::card::CardPair;
use crate::domain::errors::{FlipError, JoinError, StartGameError};

pub const BOARD_SIZE: usize = crate::domain::board::BOARD_SIZE;
pub const STARTING_TIMER_SECONDS: u32 = 180;
pub const SCORE_PER_MATCH: i32 = 10;
pub const DISCONNECT_GRACE_SECONDS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    WaitingForPlayers,
    PlayersReady,
    Running,
    Ended,
}

/// Wire value is `-1` for `None` (unresolved or a tie), `0`/`1` for a slot
/// (spec §3). Collapsed into one variant because the wire representation
/// is identical and nothing downstream distinguishes "still playing" from
/// "ended in a tie".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    None,
    Player(u8),
}

impl Winner {
    fn from_scores(scores: [i32; 2]) -> Self {
        match scores[0].cmp(&scores[1]) {
            Ordering::Greater => Winner::Player(0),
            Ordering::Less => Winner::Player(1),
            Ordering::Equal => Winner::None,
        }
    }

    pub fn as_wire(&self) -> i64 {
        match self {
            Winner::None => -1,
            Winner::Player(slot) => i64::from(*slot),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub slot: usize,
    pub reconnected: bool,
    /// True once both slots hold a username; the caller should run
    /// `start_game` when this flips true for the first time.
    pub both_ready: bool,
}

#[derive(Debug, Clone)]
pub struct GameReadyOutcome {
    pub board: Board,
    pub usernames: [String; 2],
    pub current_player: usize,
    pub timer_seconds: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct TurnSwitchOutcome {
    pub round: u32,
    pub current_player: usize,
}

#[derive(Debug, Clone)]
pub struct CardsMatchedOutcome {
    pub scores: [i32; 2],
    pub paired: [bool; BOARD_SIZE],
    pub current_player: usize,
}

pub enum FlipOutcome {
    /// First card of the pair revealed; nothing is broadcast (spec §4.5:
    /// "the client UI reveals its own flip locally").
    Revealed,
    Matched(CardsMatchedOutcome),
    Mismatched(TurnSwitchOutcome),
}

#[derive(Debug, Clone)]
pub struct GameEndOutcome {
    pub winner: Winner,
    pub scores: [i32; 2],
    pub usernames: [Option<String>; 2],
}

pub enum TickOutcome {
    Continued { timer_seconds: u32 },
    Ended(GameEndOutcome),
    /// The tick loop should have already stopped; nothing to do.
    AlreadyEnded,
}

pub struct Room {
    pub room_id: String,
    usernames: [Option<String>; 2],
    connected: [bool; 2],
    scores: [i32; 2],
    board: Option<Board>,
    flipped_index: Option<usize>,
    current_player: usize,
    round: u32,
    timer_seconds: u32,
    status: RoomStatus,
    winner: Winner,
    loop_running: bool,
}

impl Room {
    pub fn new(room_id: String) -> Self {
        Self {
            room_id,
            usernames: [None, None],
            connected: [false, false],
            scores: [0, 0],
            board: None,
            flipped_index: None,
            current_player: 0,
            round: 0,
            timer_seconds: 0,
            status: RoomStatus::WaitingForPlayers,
            winner: Winner::None,
            loop_running: false,
        }
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn scores(&self) -> [i32; 2] {
        self.scores
    }

    pub fn usernames(&self) -> [Option<String>; 2] {
        self.usernames.clone()
    }

    pub fn current_player(&self) -> usize {
        self.current_player
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn winner(&self) -> Winner {
        self.winner
    }

    pub fn slot_of(&self, username: &str) -> Option<usize> {
        self.usernames
            .iter()
            .position(|u| u.as_deref() == Some(username))
    }

    fn first_empty_slot(&self) -> Option<usize> {
        self.usernames.iter().position(|u| u.is_none())
    }

    /// Join protocol (spec §4.5). A username already holding a slot whose
    /// socket is live is rejected as a duplicate connection; one whose slot
    /// is empty (disconnect grace) reattaches. Otherwise the first free
    /// slot is assigned.
    pub fn join(&mut self, username: &str) -> Result<JoinOutcome, JoinError> {
        if let Some(slot) = self.slot_of(username) {
            if self.connected[slot] {
                return Err(JoinError::DuplicateConnection);
            }
            self.connected[slot] = true;
            return Ok(JoinOutcome {
                slot,
                reconnected: true,
                both_ready: self.both_slots_bound(),
            });
        }

        let slot = self.first_empty_slot().ok_or(JoinError::RoomFull)?;
        self.usernames[slot] = Some(username.to_string());
        self.connected[slot] = true;
        Ok(JoinOutcome {
            slot,
            reconnected: false,
            both_ready: self.both_slots_bound(),
        })
    }

    fn both_slots_bound(&self) -> bool {
        self.usernames[0].is_some() && self.usernames[1].is_some()
    }

    /// `startGame` (spec §4.5): guarded by `loop_running` so a race between
    /// the second join and an already-running loop is a no-op.
    pub fn start_game(
        &mut self,
        catalog: &[CardPair],
        rng: &mut impl Rng,
    ) -> Result<GameReadyOutcome, StartGameError> {
        if self.loop_running {
            return Err(StartGameError::AlreadyStarted);
        }
        self.loop_running = true;
        self.status = RoomStatus::PlayersReady;

        let board = Board::generate(catalog, rng).expect("catalog validated at load time");
        self.board = Some(board.clone());
        self.current_player = if rng.gen_bool(0.5) { 1 } else { 0 };
        self.round = 1;
        self.timer_seconds = STARTING_TIMER_SECONDS;
        self.status = RoomStatus::Running;

        let usernames = [
            self.usernames[0].clone().expect("both slots bound to start"),
            self.usernames[1].clone().expect("both slots bound to start"),
        ];

        Ok(GameReadyOutcome {
            board,
            usernames,
            current_player: self.current_player,
            timer_seconds: self.timer_seconds,
        })
    }

    /// One second of the countdown (spec §4.5 tick loop).
    pub fn tick(&mut self) -> TickOutcome {
        if self.status == RoomStatus::Ended {
            return TickOutcome::AlreadyEnded;
        }

        self.timer_seconds = self.timer_seconds.saturating_sub(1);
        if self.timer_seconds == 0 {
            return TickOutcome::Ended(self.end_game());
        }

        TickOutcome::Continued {
            timer_seconds: self.timer_seconds,
        }
    }

    fn end_game(&mut self) -> GameEndOutcome {
        self.status = RoomStatus::Ended;
        self.loop_running = false;
        self.winner = Winner::from_scores(self.scores);
        GameEndOutcome {
            winner: self.winner,
            scores: self.scores,
            usernames: self.usernames.clone(),
        }
    }

    /// `{action: "flip", cardIndex}` (spec §4.5).
    pub fn flip(&mut self, player_slot: usize, card_index: usize) -> Result<FlipOutcome, FlipError> {
        if self.status != RoomStatus::Running {
            return Err(FlipError::NotRunning);
        }
        if card_index >= BOARD_SIZE {
            return Err(FlipError::OutOfRange);
        }
        if player_slot != self.current_player {
            return Err(FlipError::NotYourTurn);
        }
        if self.flipped_index == Some(card_index) {
            return Err(FlipError::SameCardTwice);
        }
        let paired = self.board.as_ref().expect("board set once running").paired[card_index];
        if paired {
            return Err(FlipError::AlreadyPaired);
        }

        let Some(first) = self.flipped_index else {
            self.flipped_index = Some(card_index);
            return Ok(FlipOutcome::Revealed);
        };

        self.flipped_index = None;
        let board = self.board.as_mut().expect("board set once running");
        if board.pair_ids[first] == board.pair_ids[card_index] {
            board.paired[first] = true;
            board.paired[card_index] = true;
            self.scores[self.current_player] += SCORE_PER_MATCH;
            Ok(FlipOutcome::Matched(CardsMatchedOutcome {
                scores: self.scores,
                paired: board.paired,
                current_player: self.current_player,
            }))
        } else {
            Ok(FlipOutcome::Mismatched(self.turn_switch()))
        }
    }

    /// Legacy `{action: "move", matched}` path (spec §6): awards points
    /// without touching the board on a match, or switches turn on a miss.
    pub fn legacy_move(
        &mut self,
        player_slot: usize,
        matched: bool,
    ) -> Result<FlipOutcome, FlipError> {
        if self.status != RoomStatus::Running {
            return Err(FlipError::NotRunning);
        }
        if player_slot != self.current_player {
            return Err(FlipError::NotYourTurn);
        }

        if matched {
            self.scores[self.current_player] += SCORE_PER_MATCH;
            let paired = self.board.as_ref().map(|b| b.paired).unwrap_or([false; BOARD_SIZE]);
            Ok(FlipOutcome::Matched(CardsMatchedOutcome {
                scores: self.scores,
                paired,
                current_player: self.current_player,
            }))
        } else {
            Ok(FlipOutcome::Mismatched(self.turn_switch()))
        }
    }

    fn turn_switch(&mut self) -> TurnSwitchOutcome {
        if self.status != RoomStatus::Ended {
            self.current_player = 1 - self.current_player;
            self.round += 1;
        }
        TurnSwitchOutcome {
            round: self.round,
            current_player: self.current_player,
        }
    }

    /// `{action: "quit"}` (spec §4.5). Returns `None` if the room already
    /// ended (idempotent).
    pub fn quit(&mut self, player_slot: usize) -> Option<GameEndOutcome> {
        if self.status == RoomStatus::Ended {
            return None;
        }
        self.status = RoomStatus::Ended;
        self.loop_running = false;
        self.winner = Winner::Player((1 - player_slot) as u8);
        Some(GameEndOutcome {
            winner: self.winner,
            scores: self.scores,
            usernames: self.usernames.clone(),
        })
    }

    /// A socket read/write failed; clear the slot's live flag but keep the
    /// username, then the caller schedules a grace-period timer.
    pub fn mark_disconnected(&mut self, slot: usize) {
        self.connected[slot] = false;
    }

    pub fn is_connected(&self, slot: usize) -> bool {
        self.connected[slot]
    }

    /// Called after the 10s grace elapses. A no-op if the player
    /// reconnected in the meantime or the room already ended.
    pub fn expire_disconnect_grace(&mut self, slot: usize) -> Option<GameEndOutcome> {
        if self.connected[slot] || self.status == RoomStatus::Ended {
            return None;
        }
        self.status = RoomStatus::Ended;
        self.loop_running = false;
        self.winner = Winner::Player((1 - slot) as u8);
        Some(GameEndOutcome {
            winner: self.winner,
            scores: self.scores,
            usernames: self.usernames.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn catalog() -> Vec<CardPair> {
        (0..8)
            .map(|i| CardPair {
                pair_id: i,
                question: format!("q{i}"),
                answer: format!("a{i}"),
            })
            .collect()
    }

    #[test]
    fn join_assigns_slots_then_rejects_when_full() {
        let mut room = Room::new("room-1".into());
        let a = room.join("alice").unwrap();
        assert_eq!(a.slot, 0);
        assert!(!a.both_ready);

        let b = room.join("bob").unwrap();
        assert_eq!(b.slot, 1);
        assert!(b.both_ready);

        assert!(matches!(room.join("carol"), Err(JoinError::RoomFull)));
    }

    #[test]
    fn duplicate_connection_is_rejected_while_live() {
        let mut room = Room::new("room-1".into());
        room.join("alice").unwrap();
        assert!(matches!(
            room.join("alice"),
            Err(JoinError::DuplicateConnection)
        ));
    }

    #[test]
    fn reconnect_reattaches_to_the_same_slot() {
        let mut room = Room::new("room-1".into());
        room.join("alice").unwrap();
        room.mark_disconnected(0);
        let outcome = room.join("alice").unwrap();
        assert_eq!(outcome.slot, 0);
        assert!(outcome.reconnected);
    }

    #[test]
    fn start_game_is_idempotent_under_loop_running_guard() {
        let mut room = Room::new("room-1".into());
        room.join("alice").unwrap();
        room.join("bob").unwrap();
        let mut rng = StepRng::new(3, 5);

        room.start_game(&catalog(), &mut rng).unwrap();
        assert_eq!(room.status(), RoomStatus::Running);
        assert!(matches!(
            room.start_game(&catalog(), &mut rng),
            Err(StartGameError::AlreadyStarted)
        ));
    }

    #[test]
    fn matching_flip_keeps_turn_and_scores_ten() {
        let mut room = Room::new("room-1".into());
        room.join("alice").unwrap();
        room.join("bob").unwrap();
        let mut rng = StepRng::new(3, 5);
        room.start_game(&catalog(), &mut rng).unwrap();

        let turn = room.current_player();
        let board = room.board().unwrap().clone();
        let first = board.pair_ids.iter().position(|&p| p == 0).unwrap();
        let second = board.pair_ids.iter().rposition(|&p| p == 0).unwrap();

        assert!(matches!(
            room.flip(turn, first).unwrap(),
            FlipOutcome::Revealed
        ));
        match room.flip(turn, second).unwrap() {
            FlipOutcome::Matched(outcome) => {
                assert_eq!(outcome.scores[turn], 10);
                assert_eq!(outcome.current_player, turn);
            }
            _ => panic!("expected a match"),
        }
        assert_eq!(room.current_player(), turn);
    }

    #[test]
    fn mismatched_flip_switches_turn_and_increments_round() {
        let mut room = Room::new("room-1".into());
        room.join("alice").unwrap();
        room.join("bob").unwrap();
        let mut rng = StepRng::new(3, 5);
        room.start_game(&catalog(), &mut rng).unwrap();

        let turn = room.current_player();
        let board = room.board().unwrap().clone();
        let first = board.pair_ids.iter().position(|&p| p == 0).unwrap();
        let not_pair = board
            .pair_ids
            .iter()
            .position(|&p| p != board.pair_ids[first])
            .unwrap();

        room.flip(turn, first).unwrap();
        match room.flip(turn, not_pair).unwrap() {
            FlipOutcome::Mismatched(outcome) => {
                assert_eq!(outcome.round, 2);
                assert_eq!(outcome.current_player, 1 - turn);
            }
            _ => panic!("expected a mismatch"),
        }
        assert_eq!(room.current_player(), 1 - turn);
        assert_eq!(room.round(), 2);
    }

    #[test]
    fn flipping_the_same_card_twice_is_rejected() {
        let mut room = Room::new("room-1".into());
        room.join("alice").unwrap();
        room.join("bob").unwrap();
        let mut rng = StepRng::new(3, 5);
        room.start_game(&catalog(), &mut rng).unwrap();

        let turn = room.current_player();
        room.flip(turn, 0).unwrap();
        assert!(matches!(
            room.flip(turn, 0),
            Err(FlipError::SameCardTwice)
        ));
    }

    #[test]
    fn flipping_an_already_paired_card_is_rejected() {
        let mut room = Room::new("room-1".into());
        room.join("alice").unwrap();
        room.join("bob").unwrap();
        let mut rng = StepRng::new(3, 5);
        room.start_game(&catalog(), &mut rng).unwrap();

        let turn = room.current_player();
        let board = room.board().unwrap().clone();
        let first = board.pair_ids.iter().position(|&p| p == 0).unwrap();
        let second = board.pair_ids.iter().rposition(|&p| p == 0).unwrap();
        room.flip(turn, first).unwrap();
        room.flip(turn, second).unwrap();

        assert!(matches!(
            room.flip(turn, first),
            Err(FlipError::AlreadyPaired)
        ));
    }

    #[test]
    fn timer_hits_zero_ends_game_with_tie_when_scores_equal() {
        let mut room = Room::new("room-1".into());
        room.join("alice").unwrap();
        room.join("bob").unwrap();
        let mut rng = StepRng::new(3, 5);
        room.start_game(&catalog(), &mut rng).unwrap();

        let mut last = TickOutcome::AlreadyEnded;
        for _ in 0..STARTING_TIMER_SECONDS {
            last = room.tick();
        }
        match last {
            TickOutcome::Ended(outcome) => assert_eq!(outcome.winner, Winner::None),
            _ => panic!("expected the game to end"),
        }
        assert_eq!(room.status(), RoomStatus::Ended);
    }

    #[test]
    fn quit_awards_the_win_to_the_other_player() {
        let mut room = Room::new("room-1".into());
        room.join("alice").unwrap();
        room.join("bob").unwrap();
        let mut rng = StepRng::new(3, 5);
        room.start_game(&catalog(), &mut rng).unwrap();

        let outcome = room.quit(0).unwrap();
        assert_eq!(outcome.winner, Winner::Player(1));
        assert!(room.quit(0).is_none());
    }

    #[test]
    fn disconnect_grace_expiry_ends_game_only_if_still_disconnected() {
        let mut room = Room::new("room-1".into());
        room.join("alice").unwrap();
        room.join("bob").unwrap();
        let mut rng = StepRng::new(3, 5);
        room.start_game(&catalog(), &mut rng).unwrap();

        room.mark_disconnected(1);
        room.join("bob").unwrap();
        assert!(room.expire_disconnect_grace(1).is_none());

        room.mark_disconnected(1);
        let outcome = room.expire_disconnect_grace(1).unwrap();
        assert_eq!(outcome.winner, Winner::Player(0));
    }
}
