mod support;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

type Socket = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn recv_json(socket: &mut Socket) -> Value {
    loop {
        match socket.next().await.expect("socket closed unexpectedly") {
            Ok(Message::Text(text)) => return serde_json::from_str(&text).unwrap(),
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

async fn join(room_id: &str, username: &str) -> Socket {
    let url = format!(
        "{}/ws?roomId={room_id}&username={username}&playerHint=anything",
        support::ws_base()
    );
    let (socket, _) = connect_async(&url).await.expect("join connects");
    socket
}

#[tokio::test]
async fn both_players_joining_starts_the_game() {
    let room_id = "room-start";
    let mut alice = join(room_id, "alice-flow").await;
    let mut bob = join(room_id, "bob-flow").await;

    let alice_ready = recv_json(&mut alice).await;
    assert_eq!(alice_ready["type"], "game_ready");
    assert_eq!(alice_ready["yourName"], "alice-flow");
    assert_eq!(alice_ready["opponentName"], "bob-flow");
    assert_eq!(alice_ready["cards"].as_array().unwrap().len(), 16);

    let bob_ready = recv_json(&mut bob).await;
    assert_eq!(bob_ready["type"], "game_ready");
    assert_eq!(bob_ready["yourName"], "bob-flow");

    let alice_players_ready = recv_json(&mut alice).await;
    assert_eq!(alice_players_ready["type"], "players_ready");
    let bob_players_ready = recv_json(&mut bob).await;
    assert_eq!(bob_players_ready["type"], "players_ready");
}

#[tokio::test]
async fn quit_ends_the_game_in_favor_of_the_opponent() {
    let room_id = "room-quit";
    let mut alice = join(room_id, "alice-quit").await;
    let mut bob = join(room_id, "bob-quit").await;

    let _ = recv_json(&mut alice).await; // game_ready
    let _ = recv_json(&mut bob).await;
    let _ = recv_json(&mut alice).await; // players_ready
    let _ = recv_json(&mut bob).await;

    alice
        .send(Message::Text(json!({"action": "quit"}).to_string().into()))
        .await
        .unwrap();

    let alice_end = recv_json(&mut alice).await;
    assert_eq!(alice_end["type"], "game_end");
    assert_eq!(alice_end["winner"], 1);

    let bob_end = recv_json(&mut bob).await;
    assert_eq!(bob_end["type"], "game_end");
    assert_eq!(bob_end["winner"], 1);
}

#[tokio::test]
async fn joining_a_full_room_closes_without_an_event() {
    let room_id = "room-full";
    let _alice = join(room_id, "alice-full").await;
    let _bob = join(room_id, "bob-full").await;

    let mut carol = join(room_id, "carol-full").await;
    let outcome = carol.next().await;
    assert!(
        outcome.is_none() || matches!(outcome, Some(Ok(Message::Close(_)))),
        "third join should be closed without an application event"
    );
}

#[tokio::test]
async fn missing_query_parameters_close_without_an_event() {
    let url = format!("{}/ws", support::ws_base());
    let (mut socket, _) = connect_async(&url).await.expect("connects");
    let outcome = socket.next().await;
    assert!(
        outcome.is_none() || matches!(outcome, Some(Ok(Message::Close(_)))),
        "missing roomId/username/playerHint should close without an event"
    );
}
