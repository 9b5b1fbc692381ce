use std::time::Duration;

/// Process configuration, read once at startup from the environment. Every
/// field has a sensible default so the server runs unconfigured in
/// development.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub room_cleanup_interval: Duration,
    pub room_waiting_ttl: Duration,
    pub room_finished_ttl: Duration,
}

impl Config {
    /// Reads `PORT`, `CORS_ORIGINS`, `ROOM_CLEANUP_INTERVAL_MS`,
    /// `ROOM_WAITING_TTL_MS`, `ROOM_SELECTION_TTL_MS`, `ROOM_FINISHED_TTL_MS`.
    ///
    /// `ROOM_WAITING_TTL_MS` and `ROOM_SELECTION_TTL_MS` both feed the single
    /// lobby TTL `RoomStore::sweep` enforces — the engine doesn't track
    /// `waiting`/`selection` as distinct internal phases (see
    /// `Room::phase_label`), so there's nothing to apply the two TTLs to
    /// separately. The smaller of the two wins, the conservative choice.
    pub fn from_env() -> Self {
        let waiting_ms = env_u64("ROOM_WAITING_TTL_MS", 43_200_000);
        let selection_ms = env_u64("ROOM_SELECTION_TTL_MS", 43_200_000);
        Self {
            port: env_u64("PORT", 8080) as u16,
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            room_cleanup_interval: Duration::from_millis(env_u64("ROOM_CLEANUP_INTERVAL_MS", 600_000)),
            room_waiting_ttl: Duration::from_millis(waiting_ms.min(selection_ms)),
            room_finished_ttl: Duration::from_millis(env_u64("ROOM_FINISHED_TTL_MS", 7_200_000)),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|value| value.parse().ok()).unwrap_or(default)
}
