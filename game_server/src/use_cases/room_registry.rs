//! Room-id-keyed registry (spec §5: "one mutex protecting the room
//! registry"). Each room then owns its own lock, so no task ever needs to
//! hold the registry lock and a room lock at the same time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::Room;

pub struct RoomRegistry {
    rooms: Mutex<HashMap<String, Arc<Mutex<Room>>>>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Creates the room with `WAITING_FOR_PLAYERS` status if this is the
    /// first join for the id (spec §4.5).
    pub fn get_or_create(&self, room_id: &str) -> Arc<Mutex<Room>> {
        let mut rooms = self.rooms.lock().unwrap();
        rooms
            .entry(room_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Room::new(room_id.to_string()))))
            .clone()
    }

    pub fn get(&self, room_id: &str) -> Option<Arc<Mutex<Room>>> {
        self.rooms.lock().unwrap().get(room_id).cloned()
    }

    /// Drops the room once it reaches `ENDED` and its final broadcast has
    /// gone out (spec §3 lifecycle).
    pub fn remove(&self, room_id: &str) {
        self.rooms.lock().unwrap().remove(room_id);
    }

    pub fn len(&self) -> usize {
        self.rooms.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_returns_the_same_room_for_repeat_calls() {
        let registry = RoomRegistry::new();
        let a = registry.get_or_create("room-1");
        let b = registry.get_or_create("room-1");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_drops_the_room() {
        let registry = RoomRegistry::new();
        registry.get_or_create("room-1");
        registry.remove("room-1");
        assert!(registry.get("room-1").is_none());
    }
}
