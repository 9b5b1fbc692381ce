use crate::GlobalLeaderboard;
use crate::RoomHandle;
use dealroom_core::random_room_code;
use dealroom_core::sanitize_name;
use dealroom_gameroom::ConnectionId;
use dealroom_gameroom::PlayerId;
use dealroom_gameroom::Room;
use dealroom_gameroom::RoomJoinError;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Lookup/authorisation failures ack'd with a structured error, matching the
/// reason strings every `ClientEvent` ack carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    RoomNotFound,
    BadPassword,
    GameInProgress,
    RoomFull,
    PlayerNotFound,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            StoreError::RoomNotFound => "Room not found",
            StoreError::BadPassword => "Incorrect password",
            StoreError::GameInProgress => "Game already in progress",
            StoreError::RoomFull => "Room is full",
            StoreError::PlayerNotFound => "Player not found",
        };
        f.write_str(reason)
    }
}

impl std::error::Error for StoreError {}

impl From<RoomJoinError> for StoreError {
    fn from(error: RoomJoinError) -> Self {
        match error {
            RoomJoinError::BadPassword => StoreError::BadPassword,
            RoomJoinError::GameInProgress => StoreError::GameInProgress,
            RoomJoinError::RoomFull => StoreError::RoomFull,
        }
    }
}

/// TTLs the cleanup sweep enforces; built from the env vars `dealroom-server`
/// reads at startup (`ROOM_WAITING_TTL_MS`/`ROOM_SELECTION_TTL_MS` collapse to
/// a single lobby TTL, `ROOM_FINISHED_TTL_MS` to the finished TTL).
#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    pub waiting_ttl: Duration,
    pub finished_ttl: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            waiting_ttl: dealroom_core::ROOM_LOBBY_TTL,
            finished_ttl: dealroom_core::ROOM_FINISHED_TTL,
        }
    }
}

/// The in-memory room catalog plus its weak back-reference indexes: every
/// live room keyed by code, and player/connection indexes the dispatcher
/// uses to resolve an inbound connection to its room. Lock order is always
/// store-first, then room. Indexes never own state; `Room` (via
/// `Player::connection_id`) remains the source of truth for who is seated
/// where.
pub struct RoomStore {
    rooms: RwLock<HashMap<String, Arc<RoomHandle>>>,
    player_rooms: RwLock<HashMap<PlayerId, String>>,
    connection_players: RwLock<HashMap<ConnectionId, PlayerId>>,
    senders: RwLock<HashMap<ConnectionId, UnboundedSender<String>>>,
    global: RwLock<GlobalLeaderboard>,
    sweep_config: SweepConfig,
}

impl RoomStore {
    pub fn new(sweep_config: SweepConfig) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            player_rooms: RwLock::new(HashMap::new()),
            connection_players: RwLock::new(HashMap::new()),
            senders: RwLock::new(HashMap::new()),
            global: RwLock::new(GlobalLeaderboard::default()),
            sweep_config,
        }
    }

    pub fn room(&self, code: &str) -> Option<Arc<RoomHandle>> {
        self.rooms.read().unwrap().get(code).cloned()
    }

    pub fn room_for_player(&self, player_id: PlayerId) -> Option<Arc<RoomHandle>> {
        let code = self.player_rooms.read().unwrap().get(&player_id).cloned()?;
        self.room(&code)
    }

    pub fn player_for_connection(&self, connection_id: &str) -> Option<PlayerId> {
        self.connection_players.read().unwrap().get(connection_id).copied()
    }

    /// Registers a connection's outbound sender. Called once by the bridge
    /// when a websocket connection is accepted, before any frame is pumped.
    pub fn register_connection(&self, connection_id: ConnectionId, sender: UnboundedSender<String>) {
        self.senders.write().unwrap().insert(connection_id, sender);
    }

    /// Best-effort push to one connection; silently drops if the connection
    /// has since gone away, matching the fire-and-forget nature of every
    /// other broadcast in this crate.
    pub fn send_to(&self, connection_id: &str, text: String) {
        if let Some(sender) = self.senders.read().unwrap().get(connection_id) {
            let _ = sender.send(text);
        }
    }

    fn unique_code(&self) -> String {
        let rooms = self.rooms.read().unwrap();
        let mut rng = rand::rng();
        loop {
            let candidate = random_room_code(&mut rng);
            if !rooms.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// `create-room`: always succeeds. The creator is seated as a
    /// ready-less, unpicked host contestant.
    pub fn create(&self, connection_id: ConnectionId, name: &str) -> (Arc<RoomHandle>, PlayerId) {
        let code = self.unique_code();
        let name = sanitize_name(name);
        let mut rng = rand::rng();
        let (room, host_id) = Room::new(code.clone(), connection_id.clone(), name, &mut rng);
        let handle = Arc::new(RoomHandle::new(room));
        self.rooms.write().unwrap().insert(code.clone(), handle.clone());
        self.player_rooms.write().unwrap().insert(host_id, code);
        self.connection_players.write().unwrap().insert(connection_id, host_id);
        (handle, host_id)
    }

    /// `join-room`.
    pub fn join(
        &self,
        code: &str,
        connection_id: ConnectionId,
        name: &str,
        password: Option<&str>,
        as_spectator: bool,
    ) -> Result<(Arc<RoomHandle>, PlayerId), StoreError> {
        let handle = self.room(code).ok_or(StoreError::RoomNotFound)?;
        let name = sanitize_name(name);
        let player_id = {
            let mut room = handle.room.lock().unwrap();
            room.join(connection_id.clone(), name, password, as_spectator)?
        };
        self.player_rooms.write().unwrap().insert(player_id, code.to_string());
        self.connection_players.write().unwrap().insert(connection_id, player_id);
        Ok((handle, player_id))
    }

    /// `reconnect-player`: resolves by stable `PlayerId`, not by connection,
    /// so a client can hand back an id it cached across a dropped socket.
    pub fn reconnect(&self, player_id: PlayerId, new_connection_id: ConnectionId) -> Result<Arc<RoomHandle>, StoreError> {
        let handle = self.room_for_player(player_id).ok_or(StoreError::PlayerNotFound)?;
        let reconnected = handle.room.lock().unwrap().reconnect(player_id, new_connection_id.clone());
        if !reconnected {
            return Err(StoreError::PlayerNotFound);
        }
        self.connection_players.write().unwrap().insert(new_connection_id, player_id);
        Ok(handle)
    }

    /// A dropped connection never deletes the player or the room — only
    /// marks the player disconnected and retires the stale connection id so
    /// it can't be mistaken for a live one.
    pub fn handle_disconnect(&self, connection_id: &str) {
        self.senders.write().unwrap().remove(connection_id);
        let Some(player_id) = self.connection_players.write().unwrap().remove(connection_id) else {
            return;
        };
        if let Some(handle) = self.room_for_player(player_id) {
            handle.room.lock().unwrap().mark_disconnected(player_id);
        }
    }

    pub fn set_password(&self, handle: &Arc<RoomHandle>, actor: PlayerId, password: Option<String>) -> bool {
        let password = password.filter(|p| p.len() <= dealroom_core::MAX_PASSWORD_LEN);
        handle.room.lock().unwrap().set_password(actor, password)
    }

    pub fn update_global(&self, player_id: PlayerId, name: &str, points_earned: i64) {
        self.global.write().unwrap().upsert(player_id, name, points_earned);
    }

    pub fn top_global(&self) -> Vec<dealroom_gameroom::GlobalEntry> {
        self.global.read().unwrap().top(dealroom_core::GLOBAL_LEADERBOARD_CAP)
    }

    /// Deletes rooms idling in `waiting`/`selection` past the lobby TTL, or
    /// sitting `finished` past the finished TTL. Never touches `playing`/
    /// `offer` — those carry live timers and an in-progress game has no
    /// natural "idle" definition.
    pub fn sweep(&self) {
        let mut expired = Vec::new();
        {
            let rooms = self.rooms.read().unwrap();
            for (code, handle) in rooms.iter() {
                let room = handle.room.lock().unwrap();
                let is_expired = if room.is_finished() {
                    room.finished_age().is_some_and(|age| age >= self.sweep_config.finished_ttl)
                } else if room.phase().is_lobby() {
                    room.age() >= self.sweep_config.waiting_ttl
                } else {
                    false
                };
                if is_expired {
                    expired.push(code.clone());
                }
            }
        }
        if expired.is_empty() {
            return;
        }
        let mut rooms = self.rooms.write().unwrap();
        let mut player_rooms = self.player_rooms.write().unwrap();
        for code in &expired {
            if let Some(handle) = rooms.remove(code) {
                handle.timers.lock().unwrap().cancel_all();
                let stale_players: Vec<PlayerId> = handle.room.lock().unwrap().players().iter().map(|p| p.id()).collect();
                player_rooms.retain(|id, _| !stale_players.contains(id));
            }
            log::info!("[store] swept room {code}");
        }
    }
}
