//! Translates `Room` transitions into wire events dispatched through the
//! connection hub, and drives the per-room tick and disconnect-grace tasks
//! (spec §4.5, §5). The `Room` itself stays synchronous and hub-unaware;
//! everything async lives here, mirroring the matchmaking server's
//! `Matchmaker` wrapping the synchronous queue-pairing scan.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use conn_hub::{ClientId, ConnectionHub};

use crate::domain::room::DISCONNECT_GRACE_SECONDS;
use crate::domain::{
    CardSource, FlipError, FlipOutcome, GameEndOutcome, JoinError, Room, StartGameError,
    TickOutcome,
};
use crate::interface_adapters::protocol::ServerEvent;
use crate::use_cases::room_registry::RoomRegistry;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const DISCONNECT_GRACE: Duration = Duration::from_secs(DISCONNECT_GRACE_SECONDS);

pub enum JoinResult {
    Accepted { slot: usize, room: Arc<Mutex<Room>> },
    Rejected(JoinError),
}

#[derive(Debug)]
pub enum RoomActionError {
    RoomNotFound,
    Flip(FlipError),
}

impl From<FlipError> for RoomActionError {
    fn from(error: FlipError) -> Self {
        RoomActionError::Flip(error)
    }
}

struct RoomSnapshot {
    usernames: [Option<String>; 2],
    scores: [i32; 2],
}

pub struct RoomService {
    hub: Arc<ConnectionHub>,
    registry: Arc<RoomRegistry>,
    card_source: Arc<dyn CardSource>,
}

impl RoomService {
    pub fn new(
        hub: Arc<ConnectionHub>,
        registry: Arc<RoomRegistry>,
        card_source: Arc<dyn CardSource>,
    ) -> Self {
        Self {
            hub,
            registry,
            card_source,
        }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Join protocol (spec §4.5). `self` must be held as an `Arc` so the
    /// game-start tick task can outlive this call.
    pub fn join(
        self: &Arc<Self>,
        room_id: &str,
        username: &str,
        client_id: ClientId,
    ) -> JoinResult {
        let room = self.registry.get_or_create(room_id);
        let outcome = {
            let mut guard = room.lock().unwrap();
            guard.join(username)
        };

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(error) => return JoinResult::Rejected(error),
        };

        self.hub.bind_username(username, client_id);

        if outcome.both_ready {
            self.clone().start_game(room_id.to_string(), room.clone());
        }

        JoinResult::Accepted {
            slot: outcome.slot,
            room,
        }
    }

    fn start_game(self: Arc<Self>, room_id: String, room: Arc<Mutex<Room>>) {
        let catalog = match self.card_source.catalog() {
            Ok(catalog) => catalog,
            Err(error) => {
                tracing::error!(room_id, ?error, "card catalog unavailable, cannot start game");
                return;
            }
        };

        let ready = {
            let mut guard = room.lock().unwrap();
            let mut rng = rand::thread_rng();
            guard.start_game(&catalog, &mut rng)
        };

        match ready {
            Ok(outcome) => {
                let cards = outcome.board.cards.to_vec();
                for slot in 0..2 {
                    let event = ServerEvent::GameReady {
                        cards: cards.clone(),
                        your_name: outcome.usernames[slot].clone(),
                        opponent_name: outcome.usernames[1 - slot].clone(),
                        time_duration: outcome.timer_seconds,
                    };
                    self.send_to(&room_id, &Some(outcome.usernames[slot].clone()), &event);
                }

                self.emit_players_ready(&room_id, &room, outcome.current_player);
                self.spawn_tick_loop(room_id, room);
            }
            Err(StartGameError::AlreadyStarted) => {}
        }
    }

    fn spawn_tick_loop(self: Arc<Self>, room_id: String, room: Arc<Mutex<Room>>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.tick().await; // first tick fires immediately; skip it
            loop {
                interval.tick().await;
                let outcome = {
                    let mut guard = room.lock().unwrap();
                    guard.tick()
                };
                match outcome {
                    TickOutcome::Continued { .. } => {}
                    TickOutcome::Ended(end) => {
                        self.emit_game_end(&room_id, &end);
                        self.registry.remove(&room_id);
                        break;
                    }
                    TickOutcome::AlreadyEnded => break,
                }
            }
        });
    }

    pub fn flip(
        &self,
        room_id: &str,
        slot: usize,
        card_index: usize,
    ) -> Result<(), RoomActionError> {
        let room = self.registry.get(room_id).ok_or(RoomActionError::RoomNotFound)?;
        let outcome = {
            let mut guard = room.lock().unwrap();
            guard.flip(slot, card_index)
        }?;
        self.handle_flip_outcome(room_id, &room, outcome);
        Ok(())
    }

    pub fn legacy_move(
        &self,
        room_id: &str,
        slot: usize,
        matched: bool,
    ) -> Result<(), RoomActionError> {
        let room = self.registry.get(room_id).ok_or(RoomActionError::RoomNotFound)?;
        let outcome = {
            let mut guard = room.lock().unwrap();
            guard.legacy_move(slot, matched)
        }?;
        self.handle_flip_outcome(room_id, &room, outcome);
        Ok(())
    }

    fn handle_flip_outcome(&self, room_id: &str, room: &Arc<Mutex<Room>>, outcome: FlipOutcome) {
        match outcome {
            FlipOutcome::Revealed => {}
            FlipOutcome::Matched(matched) => {
                let snapshot = Self::snapshot(room);
                for slot in 0..2 {
                    let Some(name) = &snapshot.usernames[slot] else {
                        continue;
                    };
                    let event = ServerEvent::CardsMatched {
                        your_score: matched.scores[slot],
                        opp_score: matched.scores[1 - slot],
                        paired: matched.paired.to_vec(),
                        whose_turn: matched.current_player,
                    };
                    self.send_to(room_id, &Some(name.clone()), &event);
                }
            }
            FlipOutcome::Mismatched(switch) => {
                let event = ServerEvent::TurnSwitch {
                    round: switch.round,
                    whose_turn: switch.current_player,
                };
                self.broadcast(room_id, room, &event);
            }
        }
    }

    /// `{action: "quit"}` (spec §4.5). A no-op on an already-ended room.
    pub fn quit(&self, room_id: &str, slot: usize) {
        let Some(room) = self.registry.get(room_id) else {
            return;
        };
        let outcome = {
            let mut guard = room.lock().unwrap();
            guard.quit(slot)
        };
        if let Some(end) = outcome {
            self.emit_game_end(room_id, &end);
            self.registry.remove(room_id);
        }
    }

    /// A socket read/write failed (spec §4.5 disconnect grace). Spawns the
    /// 10-second timer; a no-op result at expiry means the player
    /// reconnected in time.
    pub fn mark_disconnected(self: &Arc<Self>, room_id: String, room: Arc<Mutex<Room>>, slot: usize) {
        {
            let mut guard = room.lock().unwrap();
            guard.mark_disconnected(slot);
        }

        let service = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(DISCONNECT_GRACE).await;
            let outcome = {
                let mut guard = room.lock().unwrap();
                guard.expire_disconnect_grace(slot)
            };
            if let Some(end) = outcome {
                service.emit_game_end(&room_id, &end);
                service.registry.remove(&room_id);
            }
        });
    }

    fn emit_players_ready(&self, room_id: &str, room: &Arc<Mutex<Room>>, current_player: usize) {
        let snapshot = Self::snapshot(room);
        for slot in 0..2 {
            let Some(name) = &snapshot.usernames[slot] else {
                continue;
            };
            let event = ServerEvent::PlayersReady {
                your_score: snapshot.scores[slot],
                opp_score: snapshot.scores[1 - slot],
                whose_turn: current_player,
            };
            self.send_to(room_id, &Some(name.clone()), &event);
        }
    }

    fn emit_game_end(&self, room_id: &str, outcome: &GameEndOutcome) {
        let event = ServerEvent::GameEnd {
            winner: outcome.winner.as_wire(),
            scores: outcome.scores,
            usernames: outcome.usernames.clone(),
        };
        for name in outcome.usernames.iter() {
            self.send_to(room_id, name, &event);
        }
    }

    fn broadcast(&self, room_id: &str, room: &Arc<Mutex<Room>>, event: &ServerEvent) {
        let snapshot = Self::snapshot(room);
        for name in snapshot.usernames.iter() {
            self.send_to(room_id, name, event);
        }
    }

    fn send_to(&self, room_id: &str, username: &Option<String>, event: &ServerEvent) {
        let Some(name) = username else { return };
        if let Err(error) = self.hub.send_to_username(name, event) {
            tracing::warn!(room_id, username = %name, %error, "failed to deliver event");
        }
    }

    fn snapshot(room: &Arc<Mutex<Room>>) -> RoomSnapshot {
        let guard = room.lock().unwrap();
        RoomSnapshot {
            usernames: guard.usernames(),
            scores: guard.scores(),
        }
    }
}
