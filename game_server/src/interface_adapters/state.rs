use std::sync::Arc;

use conn_hub::ConnectionHub;

use crate::use_cases::RoomService;

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<ConnectionHub>,
    pub room_service: Arc<RoomService>,
}
