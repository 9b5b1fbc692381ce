use crate::RoomStore;
use std::sync::Arc;
use std::time::Duration;

/// The cleanup worker: calls `RoomStore::sweep` on a fixed cadence for the
/// lifetime of the process. Spawn once at startup with
/// `tokio::spawn(run_cleanup_worker(store, interval))`.
pub async fn run_cleanup_worker(store: Arc<RoomStore>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // first tick fires immediately; the real cadence starts after it
    loop {
        ticker.tick().await;
        log::debug!("[cleanup] sweeping rooms");
        store.sweep();
    }
}
