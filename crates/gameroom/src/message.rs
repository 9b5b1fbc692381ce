use crate::projector::RoomSnapshot;
use dealroom_core::Money;

/// Shared shape for the ack-bearing requests that return a room/player
/// identity (`create-room`, `join-room`, `reconnect-player`), and for
/// `set-room-password` with the identity fields simply omitted.
#[derive(Debug, Clone, serde::Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RoomAck {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RoomAck {
    pub fn ok(room_code: impl Into<String>, player_id: impl Into<String>) -> Self {
        Self {
            success: true,
            room_code: Some(room_code.into()),
            player_id: Some(player_id.into()),
            error: None,
        }
    }
    pub fn ok_room_only(room_code: impl Into<String>) -> Self {
        Self {
            success: true,
            room_code: Some(room_code.into()),
            ..Default::default()
        }
    }
    pub fn ok_bare() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }
    pub fn err(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
            ..Default::default()
        }
    }
}

/// A settled contestant's row in a per-game leaderboard, ranked by
/// `dealroom_rules::rank_leaderboard`.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderEntry {
    pub player_id: String,
    pub player_name: String,
    pub amount: Money,
    pub points: i64,
    pub was_box_value: bool,
    pub rank: usize,
}

/// A row of the process-lifetime global leaderboard. Built by
/// `dealroom-hosting` from its own accumulating domain entry and handed to
/// the protocol layer purely as wire data.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalEntry {
    pub rank: usize,
    pub public_id: String,
    pub player_name: String,
    pub total_points: i64,
    pub games_played: u32,
}

/// Outbound pushes and request acknowledgements. Internally tagged by
/// `type`, matching the inbound `ClientEvent` wire shape.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Ack {
        request_id: String,
        #[serde(flatten)]
        ack: RoomAck,
    },
    LeaderboardAck {
        request_id: String,
        success: bool,
        leaderboard: Vec<GlobalEntry>,
    },
    GameStateUpdate {
        #[serde(flatten)]
        snapshot: Box<RoomSnapshot>,
    },
    ChatMessage {
        id: String,
        sender_id: String,
        sender_name: String,
        content: String,
        timestamp_ms: u64,
        room_code: String,
    },
    LeaderboardUpdate {
        leaderboard: Vec<LeaderEntry>,
    },
    GameEnded {
        leaderboard: Vec<LeaderEntry>,
    },
    PlayerLeft {
        player_id: String,
    },
}

impl ServerMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_omits_absent_fields() {
        let ack = ServerMessage::Ack {
            request_id: "r1".into(),
            ack: RoomAck::err("Room not found"),
        };
        let json = ack.to_json();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("Room not found"));
        assert!(!json.contains("roomCode"));
    }

    #[test]
    fn game_state_update_tags_as_its_type() {
        let snapshot = RoomSnapshot {
            room_code: "ABCDEF".into(),
            phase: crate::phase::PhaseLabel::Waiting,
            current_round: 0,
            boxes_to_open_this_round: 5,
            boxes_opened_this_round: vec![],
            remaining_values: vec![],
            eliminated_values: vec![],
            players: vec![],
            boxes: vec![],
            current_offer: None,
            offer_expires_at: None,
            current_turn_player_id: None,
            turn_expires_at: None,
            recently_opened_box: None,
        };
        let message = ServerMessage::GameStateUpdate { snapshot: Box::new(snapshot) };
        let json = message.to_json();
        assert!(json.contains("\"type\":\"game-state-update\""));
        assert!(json.contains("\"roomCode\":\"ABCDEF\""));
    }
}
