//! Wire DTOs for the matchmaking websocket. Inbound frames are validated by
//! hand (mirroring the reference's `checkValidUser`) rather than through a
//! single tagged enum, so a malformed `queue` frame can still be told apart
//! from an unknown `type` and answered with a specific `error` message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub struct QueueRequest {
    pub username: String,
    pub token: String,
    pub score: i64,
}

pub struct CancelRequest {
    pub username: String,
    pub token: String,
}

/// Extracts and validates a `queue` frame's fields from the raw JSON value.
pub fn parse_queue_request(value: &Value) -> Result<QueueRequest, &'static str> {
    let username = value
        .get("username")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or("Invalid JSON format, please check the fields")?;
    let token = value
        .get("token")
        .and_then(Value::as_str)
        .ok_or("Invalid JSON format, please check the fields")?;
    let score = value
        .get("score")
        .and_then(Value::as_f64)
        .ok_or("Invalid score format")?;

    Ok(QueueRequest {
        username: username.to_string(),
        token: token.to_string(),
        // Score accepts integer or real; stored as integer (truncation).
        score: score.trunc() as i64,
    })
}

/// Extracts and validates a `cancel` frame's fields from the raw JSON value.
pub fn parse_cancel_request(value: &Value) -> Result<CancelRequest, &'static str> {
    let username = value
        .get("username")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or("Invalid JSON format, please check the fields")?;
    let token = value
        .get("token")
        .and_then(Value::as_str)
        .ok_or("Invalid JSON format, please check the fields")?;

    Ok(CancelRequest {
        username: username.to_string(),
        token: token.to_string(),
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Welcome {
        message: String,
        client_id: String,
    },
    QueueSuccess {
        message: String,
    },
    CancelSuccess {
        message: String,
    },
    Error {
        message: String,
    },
    MatchFound {
        opponent: String,
        score: i64,
        #[serde(rename = "roomId")]
        room_id: String,
        timestamp: u64,
        message: String,
    },
    QueueTimeout {
        message: String,
    },
    QueueCleared {
        message: String,
    },
    ConnectionClosing {
        message: String,
        #[serde(rename = "roomId")]
        room_id: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(rename = "matchesMade")]
    pub matches_made: u64,
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_queue_request_accepts_integer_or_real_score() {
        let req = parse_queue_request(&json!({"username": "a", "token": "t", "score": 1200})).unwrap();
        assert_eq!(req.score, 1200);

        let req = parse_queue_request(&json!({"username": "a", "token": "t", "score": 1200.9})).unwrap();
        assert_eq!(req.score, 1200);
    }

    #[test]
    fn parse_queue_request_rejects_missing_fields() {
        assert!(parse_queue_request(&json!({"username": "a", "token": "t"})).is_err());
        assert!(parse_queue_request(&json!({"token": "t", "score": 1})).is_err());
    }

    #[test]
    fn server_event_serializes_with_snake_case_type_tag() {
        let event = ServerEvent::MatchFound {
            opponent: "bob".into(),
            score: 1150,
            room_id: "abc123".into(),
            timestamp: 42,
            message: "go".into(),
        };
        let text = serde_json::to_string(&event).unwrap();
        assert!(text.contains(r#""type":"match_found""#));
        assert!(text.contains(r#""roomId":"abc123""#));
    }
}
