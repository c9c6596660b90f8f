//! Runtime configuration read from the environment, mirroring the sibling
//! matchmaking server's `frameworks::config`. Tick/timer constants from
//! spec §4.5 (room tick 1s, disconnect grace 10s, ping cadence 5s, starting
//! timer 180s) are compiled-in next to the domain types that use them, not
//! environment-tunable — the reference does not expose them either.

use std::env;
use std::path::PathBuf;

pub fn http_port() -> u16 {
    env::var("GAME_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

/// Path to the card catalog JSON file (spec §6). Defaults to the bundled
/// sample catalog shipped with this crate so a local run or `cargo test`
/// works without any environment setup.
pub fn card_catalog_path() -> PathBuf {
    env::var("CARD_CATALOG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/cards.json"))
}
