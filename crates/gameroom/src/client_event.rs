/// Inbound events, decoded from the wire by `Protocol::decode`. Ack-bearing
/// requests carry a `request_id` the dispatcher echoes back on the matching
/// `ServerMessage::Ack`/`LeaderboardAck`, an explicit correlation id since
/// this transport has no native callback slot.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    CreateRoom {
        request_id: String,
        player_name: String,
    },
    JoinRoom {
        request_id: String,
        room_code: String,
        player_name: String,
        #[serde(default)]
        password: Option<String>,
        #[serde(default)]
        as_spectator: bool,
    },
    ReconnectPlayer {
        request_id: String,
        player_id: String,
    },
    SetRoomPassword {
        request_id: String,
        #[serde(default)]
        password: Option<String>,
    },
    GetGlobalLeaderboard {
        request_id: String,
    },
    SelectBox {
        box_number: u8,
    },
    PlayerReady {},
    StartGame {},
    OpenBox {
        box_number: u8,
    },
    DealResponse {
        accepted: bool,
    },
    ChatMessage {
        content: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_create_room() {
        let json = r#"{"type":"create-room","requestId":"r1","playerName":"Alice"}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, ClientEvent::CreateRoom { player_name, .. } if player_name == "Alice"));
    }

    #[test]
    fn decodes_open_box_with_camel_case_field() {
        let json = r#"{"type":"open-box","boxNumber":5}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, ClientEvent::OpenBox { box_number: 5 }));
    }

    #[test]
    fn rejects_unknown_event_type() {
        let json = r#"{"type":"detonate","boxNumber":5}"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
