// Matchmaking server: pairs queued players by nearest score and hands them a
// shared room id for the game server. See `frameworks::server` for wiring.

pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use frameworks::config::http_port;
pub use frameworks::server::run;
