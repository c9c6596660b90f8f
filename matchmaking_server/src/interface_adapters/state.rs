use std::sync::Arc;

use conn_hub::ConnectionHub;

use crate::use_cases::{Matchmaker, QueueService};

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<ConnectionHub>,
    pub queue_service: Arc<QueueService>,
    pub matchmaker: Arc<Matchmaker>,
}
