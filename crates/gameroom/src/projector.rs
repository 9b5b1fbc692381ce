use crate::phase::PhaseLabel;
use crate::room::Room;
use crate::PlayerId;
use dealroom_core::round_plan;
use dealroom_core::Money;
use dealroom_core::Round;

/// A box just opened, piggybacked on the broadcast that first reveals it.
/// Never repeated on subsequent broadcasts.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyOpenedBox {
    pub box_number: u8,
    pub value: Money,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: String,
    pub display_name: String,
    pub is_host: bool,
    pub role: &'static str,
    pub is_ready: bool,
    pub is_connected: bool,
    pub is_active: bool,
    pub has_dealt: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxView {
    pub number: u8,
    pub is_opened: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Money>,
    pub is_player_box: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

/// Per-recipient view of a room. Unopened box values and other players'
/// personal-box identities never leak into this type; building it is the
/// only place those secrets are allowed to be redacted.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_code: String,
    pub phase: PhaseLabel,
    pub current_round: Round,
    pub boxes_to_open_this_round: usize,
    pub boxes_opened_this_round: Vec<u8>,
    pub remaining_values: Vec<Money>,
    pub eliminated_values: Vec<Money>,
    pub players: Vec<PlayerView>,
    pub boxes: Vec<BoxView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_offer: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_expires_at: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_turn_player_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_expires_at: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recently_opened_box: Option<RecentlyOpenedBox>,
}

/// Builds a per-recipient snapshot of `room`. Read-only and idempotent:
/// calling it twice for the same room state produces identical output
/// (`recently_opened_box` aside, which the caller supplies per broadcast).
pub fn project(
    room: &Room,
    recipient: PlayerId,
    now_ms: u64,
    recently_opened_box: Option<RecentlyOpenedBox>,
) -> RoomSnapshot {
    let recipient_box_number = room
        .player(recipient)
        .and_then(|p| p.contestant())
        .and_then(|c| c.box_number);

    let players = room
        .players()
        .iter()
        .map(|p| PlayerView {
            id: p.id().to_string(),
            display_name: p.display_name().to_string(),
            is_host: p.is_host(),
            role: if p.is_contestant() { "contestant" } else { "spectator" },
            is_ready: p.is_ready(),
            is_connected: p.is_connected(),
            is_active: p.is_active(),
            has_dealt: p.has_dealt(),
        })
        .collect();

    let boxes = room
        .boxes()
        .iter()
        .map(|b| BoxView {
            number: b.number(),
            is_opened: b.is_opened(),
            value: b.is_opened().then(|| b.value()),
            is_player_box: Some(b.number()) == recipient_box_number,
            owner_id: b.opened_by().map(|id| id.to_string()),
        })
        .collect();

    RoomSnapshot {
        room_code: room.code().to_string(),
        phase: room.phase_label(),
        current_round: room.current_round(),
        boxes_to_open_this_round: round_plan(room.current_round()),
        boxes_opened_this_round: room.boxes_opened_this_round().to_vec(),
        remaining_values: room.remaining_values().to_vec(),
        eliminated_values: room.eliminated_values().to_vec(),
        players,
        boxes,
        current_offer: room.current_offer(),
        offer_expires_at: room.offer_deadline().map(|d| d.epoch_ms(now_ms)),
        current_turn_player_id: room.current_turn_player_id().map(|id| id.to_string()),
        turn_expires_at: room.turn_deadline().map(|d| d.epoch_ms(now_ms)),
        recently_opened_box,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn unopened_boxes_never_leak_their_value() {
        let mut rng = SmallRng::seed_from_u64(1);
        let (room, host_id) = Room::new("ABCDEF".into(), "conn-host".into(), "Host".into(), &mut rng);
        let snapshot = project(&room, host_id, 0, None);
        for b in &snapshot.boxes {
            if !b.is_opened {
                assert!(b.value.is_none());
            }
        }
    }

    #[test]
    fn recipients_own_box_is_marked() {
        let mut rng = SmallRng::seed_from_u64(2);
        let (mut room, host_id) = Room::new("ABCDEF".into(), "conn-host".into(), "Host".into(), &mut rng);
        room.select_box(host_id, 7);
        let snapshot = project(&room, host_id, 0, None);
        let own = snapshot.boxes.iter().find(|b| b.number == 7).unwrap();
        assert!(own.is_player_box);
        let other = snapshot.boxes.iter().find(|b| b.number == 8).unwrap();
        assert!(!other.is_player_box);
    }

    #[test]
    fn waiting_label_becomes_selection_once_a_box_is_picked() {
        let mut rng = SmallRng::seed_from_u64(3);
        let (mut room, host_id) = Room::new("ABCDEF".into(), "conn-host".into(), "Host".into(), &mut rng);
        assert_eq!(project(&room, host_id, 0, None).phase, PhaseLabel::Waiting);
        room.select_box(host_id, 1);
        assert_eq!(project(&room, host_id, 0, None).phase, PhaseLabel::Selection);
    }
}
