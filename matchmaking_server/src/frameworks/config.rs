//! Runtime configuration read from the environment, mirroring the teacher's
//! `frameworks::config` modules. Tick/timeout constants from spec §4.4 are
//! compiled-in (the reference does not expose them as env vars either);
//! only the process-level knobs below are environment-tunable.

use std::env;

pub fn http_port() -> u16 {
    env::var("MATCHMAKER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3003)
}

/// Tag attached to every queue entry. Recorded but never used as a pairing
/// filter (spec §9 open question, resolved: no cluster filtering in core).
pub fn cluster_tag() -> String {
    env::var("CLUSTER").unwrap_or_else(|_| "default".to_string())
}

/// Connection string for the persistent queue/match store. The store itself
/// is an external collaborator out of scope for this crate (spec §1); this
/// is read and logged at startup so a Mongo-backed `QueueStore`/`MatchesStore`
/// adapter can be wired in behind the same ports without touching callers.
pub fn mongo_uri() -> Option<String> {
    env::var("MONGO_URI").ok()
}
