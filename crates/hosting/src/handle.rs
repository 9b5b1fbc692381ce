use crate::RoomTimers;
use dealroom_gameroom::Room;
use std::sync::Mutex;

/// A single room's authoritative state plus its timer handles. `room` is a
/// plain blocking `std::sync::Mutex`, not `tokio::sync::Mutex`: every engine
/// mutation runs synchronously and releases the lock before any network I/O,
/// so nothing ever awaits while holding it.
pub struct RoomHandle {
    pub room: Mutex<Room>,
    pub timers: Mutex<RoomTimers>,
}

impl RoomHandle {
    pub fn new(room: Room) -> Self {
        Self {
            room: Mutex::new(room),
            timers: Mutex::new(RoomTimers::default()),
        }
    }
}
