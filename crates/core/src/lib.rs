//! Core type aliases, identity primitives, and constants for dealroom.
//!
//! This crate provides the foundational types and configuration parameters
//! shared across the dealroom workspace: the room-code alphabet, timeout and
//! roster limits, the banker's value ladder, and the `ID<T>` identity wrapper
//! used by every domain entity.
#![allow(dead_code)]

mod id;
mod names;
#[cfg(feature = "server")]
mod runtime;

pub use id::*;
pub use names::*;
#[cfg(feature = "server")]
pub use runtime::*;

use std::time::Duration;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Monetary amount drawn from the value ladder.
pub type Money = f64;
/// Seat/round/points counters.
pub type Round = u32;

// ============================================================================
// ROSTER LIMITS
// ============================================================================
/// Maximum contestants seated in a room.
pub const MAX_CONTESTANTS: usize = 6;
/// Minimum contestants required to start a game.
pub const MIN_CONTESTANTS_TO_START: usize = 2;
/// Maximum display name length, post-sanitisation.
pub const MAX_NAME_LEN: usize = 16;
/// Maximum room password length.
pub const MAX_PASSWORD_LEN: usize = 64;
/// Maximum chat message length.
pub const MAX_CHAT_LEN: usize = 500;
/// Number of chat messages retained per room.
pub const CHAT_HISTORY_CAP: usize = 100;
/// Number of boxes on the board.
pub const BOX_COUNT: usize = 20;
/// Number of entries retained in the global leaderboard query.
pub const GLOBAL_LEADERBOARD_CAP: usize = 100;

// ============================================================================
// TIMERS
// ============================================================================
/// Per-turn decision deadline.
pub const TURN_TIMEOUT: Duration = Duration::from_secs(20);
/// Per-offer response deadline.
pub const OFFER_TIMEOUT: Duration = Duration::from_secs(20);
/// Cosmetic pause between the last box of a round and the banker's call.
pub const ROUND_END_PAUSE: Duration = Duration::from_millis(1_500);
/// Default cleanup sweep cadence.
pub const CLEANUP_SWEEP_INTERVAL: Duration = Duration::from_secs(600);
/// Default TTL for rooms idling in `waiting`/`selection`.
pub const ROOM_LOBBY_TTL: Duration = Duration::from_secs(12 * 3_600);
/// Default TTL for rooms sitting in `finished`.
pub const ROOM_FINISHED_TTL: Duration = Duration::from_secs(2 * 3_600);

// ============================================================================
// VALUE LADDER
// ============================================================================
/// The 20 monetary values contestants play for, ascending. Identical across
/// all rooms; box values are a shuffled permutation of this multiset.
pub const VALUE_LADDER: [Money; BOX_COUNT] = [
    0.01, 1.0, 5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 200.0, 300.0, 400.0, 500.0, 750.0, 1_000.0,
    5_000.0, 10_000.0, 25_000.0, 50_000.0, 75_000.0, 100_000.0,
];

/// Boxes opened per round before an offer is made. Rounds beyond the table
/// open a single box each.
pub fn round_plan(round: Round) -> usize {
    match round {
        1 => 5,
        2 => 4,
        3 => 3,
        4 => 2,
        _ => 1,
    }
}

// ============================================================================
// ROOM CODES
// ============================================================================
/// Alphabet for room codes: uppercase alphanumerics minus visually ambiguous
/// characters (`0 1 I O`).
pub const ROOM_CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Room codes are exactly this many characters.
pub const ROOM_CODE_LEN: usize = 6;

/// Draws a uniformly random room code candidate. Collision retry against the
/// live room catalog is the caller's responsibility (see `dealroom-hosting`).
pub fn random_room_code(rng: &mut impl rand::Rng) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Shuffles a slice in place using an unbiased Fisher-Yates permutation.
pub fn shuffle<T>(items: &mut [T], rng: &mut impl rand::Rng) {
    use rand::seq::SliceRandom;
    items.shuffle(rng);
}

/// Current wall-clock time as epoch milliseconds, for projecting monotonic
/// `Instant` deadlines into timestamps clients can render a countdown
/// against (see `dealroom_gameroom::timer::Deadline::epoch_ms`).
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_plan_matches_table() {
        assert_eq!(round_plan(1), 5);
        assert_eq!(round_plan(2), 4);
        assert_eq!(round_plan(3), 3);
        assert_eq!(round_plan(4), 2);
        assert_eq!(round_plan(5), 1);
        assert_eq!(round_plan(100), 1);
    }

    #[test]
    fn ladder_has_twenty_values() {
        assert_eq!(VALUE_LADDER.len(), BOX_COUNT);
    }

    #[test]
    fn room_code_alphabet_excludes_ambiguous_chars() {
        let alphabet = ROOM_CODE_ALPHABET;
        for banned in [b'0', b'1', b'I', b'O'] {
            assert!(!alphabet.contains(&banned));
        }
        assert_eq!(alphabet.len(), 32);
    }

    #[test]
    fn random_room_code_has_correct_length_and_alphabet() {
        let mut rng = rand::rng();
        let code = random_room_code(&mut rng);
        assert_eq!(code.len(), ROOM_CODE_LEN);
        assert!(code.chars().all(|c| ROOM_CODE_ALPHABET.contains(&(c as u8))));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = rand::rng();
        let mut values = VALUE_LADDER;
        let original = values;
        shuffle(&mut values, &mut rng);
        let mut sorted_shuffled = values.to_vec();
        let mut sorted_original = original.to_vec();
        sorted_shuffled.sort_by(|a, b| a.partial_cmp(b).unwrap());
        sorted_original.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(sorted_shuffled, sorted_original);
    }
}
