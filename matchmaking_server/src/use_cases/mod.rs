// Application layer: the matchmaker tick worker and the request-driven
// queue/cancel use case, both operating purely against domain ports.

pub mod matchmaker;
pub mod queue_service;

pub use matchmaker::{Matchmaker, MatchmakerConfig};
pub use queue_service::QueueService;
