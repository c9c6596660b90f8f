//! Connection manager shared by the matchmaking and game servers: upgrades
//! are performed by each service, but the `clientId -> socket` and
//! `username -> clientId` bookkeeping lives here so both services track
//! client identity and route outbound events the same way.

mod hub;

pub use hub::{ClientId, ConnectionHub, HubError, Outbound, CLOSE_GRACE};
