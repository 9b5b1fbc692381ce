use tokio::task::JoinHandle;

/// At most one turn timer and one offer timer per room. Arming
/// a new one of a kind cancels whatever was previously running. The real
/// correctness guarantee against a stale fire is the engine's own guard
/// (`Room::turn_timeout` checks the expected player still matches, and
/// `on_offer_timeout` checks the phase is still `offer`) — aborting here is
/// just cleanup so a replaced sleep doesn't linger as a dangling task.
#[derive(Default)]
pub struct RoomTimers {
    turn: Option<JoinHandle<()>>,
    offer: Option<JoinHandle<()>>,
}

impl RoomTimers {
    pub fn arm_turn(&mut self, handle: JoinHandle<()>) {
        if let Some(old) = self.turn.replace(handle) {
            old.abort();
        }
    }

    pub fn arm_offer(&mut self, handle: JoinHandle<()>) {
        if let Some(old) = self.offer.replace(handle) {
            old.abort();
        }
    }

    pub fn cancel_turn(&mut self) {
        if let Some(old) = self.turn.take() {
            old.abort();
        }
    }

    pub fn cancel_offer(&mut self) {
        if let Some(old) = self.offer.take() {
            old.abort();
        }
    }

    /// Called on finalisation and on room sweep: no more timers should ever
    /// fire for this room.
    pub fn cancel_all(&mut self) {
        self.cancel_turn();
        self.cancel_offer();
    }
}
