//! Wire DTOs for the game websocket. Inbound `action` frames are validated
//! by hand against the raw JSON value, mirroring the matchmaking server's
//! `parse_*` functions, so a malformed `flip` frame can be told apart from
//! an unrecognized `action` (spec §4.2: the latter is ignored silently, the
//! former is logged and dropped).

use serde::Serialize;
use serde_json::Value;

pub enum InboundAction {
    Flip { card_index: i64 },
    Move { matched: bool },
    Quit,
    /// Parsed but not one of `{flip, move, quit}` (spec §4.2): ignored, not
    /// an error.
    Ignored,
}

/// Returns `Err` only for a structurally invalid `flip`/`move` frame (a
/// recognized action with a missing/malformed payload field); an unknown
/// action is `Ok(InboundAction::Ignored)`.
pub fn parse_inbound_action(value: &Value) -> Result<InboundAction, &'static str> {
    let action = match value.get("action").and_then(Value::as_str) {
        Some(a) if !a.is_empty() => a,
        _ => return Err("Invalid JSON format, please check the fields"),
    };

    match action {
        "flip" => {
            let card_index = value
                .get("cardIndex")
                .and_then(Value::as_i64)
                .ok_or("cardIndex must be an integer")?;
            Ok(InboundAction::Flip { card_index })
        }
        "move" => {
            let matched = value
                .get("matched")
                .and_then(Value::as_bool)
                .ok_or("matched must be a boolean")?;
            Ok(InboundAction::Move { matched })
        }
        "quit" => Ok(InboundAction::Quit),
        _ => Ok(InboundAction::Ignored),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    GameReady {
        cards: Vec<String>,
        #[serde(rename = "yourName")]
        your_name: String,
        #[serde(rename = "opponentName")]
        opponent_name: String,
        #[serde(rename = "timeDuration")]
        time_duration: u32,
    },
    PlayersReady {
        #[serde(rename = "yourScore")]
        your_score: i32,
        #[serde(rename = "oppScore")]
        opp_score: i32,
        #[serde(rename = "whoseTurn")]
        whose_turn: usize,
    },
    CardsMatched {
        #[serde(rename = "yourScore")]
        your_score: i32,
        #[serde(rename = "oppScore")]
        opp_score: i32,
        paired: Vec<bool>,
        #[serde(rename = "whoseTurn")]
        whose_turn: usize,
    },
    TurnSwitch {
        round: u32,
        #[serde(rename = "whoseTurn")]
        whose_turn: usize,
    },
    GameEnd {
        winner: i64,
        scores: [i32; 2],
        usernames: [Option<String>; 2],
    },
    Error {
        message: String,
    },
}
