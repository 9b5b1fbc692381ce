use dealroom_gameroom::GlobalEntry;
use dealroom_gameroom::PlayerId;
use dealroom_rules::rank_leaderboard;
use std::collections::HashMap;

struct GlobalRecord {
    display_name: String,
    total_points: i64,
    games_played: u32,
}

/// Process-lifetime leaderboard accumulated across every finished game in
/// every room. Keyed by stable `PlayerId`, so a reconnecting or rejoining
/// player keeps their lifetime total. There is no durable store behind it;
/// a restart simply starts this at zero.
#[derive(Default)]
pub struct GlobalLeaderboard {
    records: HashMap<PlayerId, GlobalRecord>,
    order: Vec<PlayerId>,
}

impl GlobalLeaderboard {
    /// Upserts by `player_id`: accumulates `total_points`, increments
    /// `games_played`. First insertion fixes this player's tie-break
    /// position for `top()`.
    pub fn upsert(&mut self, player_id: PlayerId, display_name: &str, points_earned: i64) {
        match self.records.get_mut(&player_id) {
            Some(record) => {
                record.total_points += points_earned;
                record.games_played += 1;
                record.display_name = display_name.to_string();
            }
            None => {
                self.records.insert(
                    player_id,
                    GlobalRecord {
                        display_name: display_name.to_string(),
                        total_points: points_earned,
                        games_played: 1,
                    },
                );
                self.order.push(player_id);
            }
        }
    }

    /// Top `limit` entries, ranked by `dealroom_rules::rank_leaderboard`
    /// (descending total points, ties broken by first-seen order).
    pub fn top(&self, limit: usize) -> Vec<GlobalEntry> {
        let items: Vec<(PlayerId, &GlobalRecord)> = self
            .order
            .iter()
            .filter_map(|id| self.records.get(id).map(|record| (*id, record)))
            .collect();
        rank_leaderboard(items, |(_, record)| record.total_points)
            .into_iter()
            .take(limit)
            .map(|(rank, (id, record))| GlobalEntry {
                rank,
                public_id: format!("{}#{}", record.display_name, id.short()),
                player_name: record.display_name.clone(),
                total_points: record.total_points,
                games_played: record.games_played,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_accumulates_points_and_games() {
        let mut board = GlobalLeaderboard::default();
        let id = PlayerId::default();
        board.upsert(id, "Alice", 100);
        board.upsert(id, "Alice", 50);
        let top = board.top(10);
        assert_eq!(top[0].total_points, 150);
        assert_eq!(top[0].games_played, 2);
    }

    #[test]
    fn public_id_embeds_four_char_short_id() {
        let mut board = GlobalLeaderboard::default();
        let id = PlayerId::default();
        board.upsert(id, "Bob", 10);
        let top = board.top(10);
        assert!(top[0].public_id.starts_with("Bob#"));
        assert_eq!(top[0].public_id.len(), "Bob#".len() + 4);
    }

    #[test]
    fn top_truncates_to_limit() {
        let mut board = GlobalLeaderboard::default();
        for n in 0..5 {
            board.upsert(PlayerId::default(), &format!("P{n}"), n as i64);
        }
        assert_eq!(board.top(3).len(), 3);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let mut board = GlobalLeaderboard::default();
        let first = PlayerId::default();
        let second = PlayerId::default();
        board.upsert(first, "First", 50);
        board.upsert(second, "Second", 50);
        let top = board.top(10);
        assert_eq!(top[0].player_name, "First");
        assert_eq!(top[1].player_name, "Second");
    }
}
