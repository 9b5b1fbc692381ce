//! Room catalog, connection indexes, the global leaderboard, the cleanup
//! sweep worker, and the `actix-ws` bridge for the dealroom party-game
//! server.
//!
//! ## Modules
//!
//! - [`store`] — the room catalog: code→room, player→room, connection→player
//!   indexes, plus create/join/reconnect/disconnect/sweep
//! - [`global`] — the process-lifetime global leaderboard
//! - [`handle`] — one room's mutex-guarded state plus its timer handles
//! - [`timers`] — cancellable per-room turn/offer timer handles
//! - [`dispatch`] — maps inbound wire events to engine operations and
//!   broadcasts the results
//! - [`bridge`] — pumps an `actix-ws` session through the dispatcher
//! - [`sweep`] — the periodic TTL cleanup worker

mod bridge;
mod dispatch;
mod global;
mod handle;
mod store;
mod sweep;
mod timers;

pub use bridge::bridge;
pub use dispatch::dispatch;
pub use dispatch::on_disconnect;
pub use dispatch::on_offer_timeout;
pub use dispatch::on_turn_timeout;
pub use global::GlobalLeaderboard;
pub use handle::RoomHandle;
pub use store::RoomStore;
pub use store::StoreError;
pub use store::SweepConfig;
pub use sweep::run_cleanup_worker;
pub use timers::RoomTimers;
