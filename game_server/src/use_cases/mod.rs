// Use cases layer: application workflows for the game server.

pub mod room_registry;
pub mod room_service;

pub use room_registry::RoomRegistry;
pub use room_service::{JoinResult, RoomActionError, RoomService};
