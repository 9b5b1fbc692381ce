use crate::RoomHandle;
use crate::RoomStore;
use dealroom_core::ROUND_END_PAUSE;
use dealroom_gameroom::ClientEvent;
use dealroom_gameroom::ConnectionId;
use dealroom_gameroom::DealOutcome;
use dealroom_gameroom::FinalEntry;
use dealroom_gameroom::LeaderEntry;
use dealroom_gameroom::OfferResolution;
use dealroom_gameroom::OpenBoxOutcome;
use dealroom_gameroom::PlayerId;
use dealroom_gameroom::Protocol;
use dealroom_gameroom::RecentlyOpenedBox;
use dealroom_gameroom::RoomAck;
use dealroom_gameroom::ServerMessage;
use dealroom_gameroom::TurnTimeoutOutcome;
use dealroom_gameroom::project;
use std::sync::Arc;
use std::time::Duration;

/// Decodes one inbound wire message and dispatches it. Called by the
/// `actix-ws` bridge for every text frame it receives on a connection.
pub async fn dispatch(store: Arc<RoomStore>, connection_id: ConnectionId, raw: &str) {
    let event = match Protocol::decode(raw) {
        Ok(event) => event,
        Err(err) => {
            log::debug!("[dispatch {connection_id}] dropping malformed frame: {err}");
            return;
        }
    };
    match event {
        ClientEvent::CreateRoom { request_id, player_name } => {
            handle_create_room(&store, connection_id, request_id, player_name).await;
        }
        ClientEvent::JoinRoom {
            request_id,
            room_code,
            player_name,
            password,
            as_spectator,
        } => {
            handle_join_room(&store, connection_id, request_id, room_code, player_name, password, as_spectator).await;
        }
        ClientEvent::ReconnectPlayer { request_id, player_id } => {
            handle_reconnect(&store, connection_id, request_id, player_id).await;
        }
        ClientEvent::SetRoomPassword { request_id, password } => {
            handle_set_password(&store, &connection_id, request_id, password).await;
        }
        ClientEvent::GetGlobalLeaderboard { request_id } => {
            handle_get_global_leaderboard(&store, &connection_id, request_id).await;
        }
        ClientEvent::SelectBox { box_number } => {
            if let Some((handle, actor)) = resolve(&store, &connection_id) {
                handle.room.lock().unwrap().select_box(actor, box_number);
                broadcast(&store, &handle, None).await;
            }
        }
        ClientEvent::PlayerReady {} => {
            if let Some((handle, actor)) = resolve(&store, &connection_id) {
                handle.room.lock().unwrap().set_ready(actor);
                broadcast(&store, &handle, None).await;
            }
        }
        ClientEvent::StartGame {} => {
            if let Some((handle, actor)) = resolve(&store, &connection_id) {
                let started = {
                    let mut room = handle.room.lock().unwrap();
                    let mut rng = rand::rng();
                    room.start_game(actor, &mut rng)
                };
                if started {
                    broadcast(&store, &handle, None).await;
                    sync_timers(&store, handle.clone());
                }
            }
        }
        ClientEvent::OpenBox { box_number } => {
            if let Some((handle, actor)) = resolve(&store, &connection_id) {
                handle_open_box(&store, handle, actor, box_number).await;
            }
        }
        ClientEvent::DealResponse { accepted } => {
            if let Some((handle, actor)) = resolve(&store, &connection_id) {
                handle_deal_response(&store, handle, actor, accepted).await;
            }
        }
        ClientEvent::ChatMessage { content } => {
            if let Some((handle, actor)) = resolve(&store, &connection_id) {
                handle_chat(&store, &handle, actor, content).await;
            }
        }
    }
}

fn resolve(store: &Arc<RoomStore>, connection_id: &str) -> Option<(Arc<RoomHandle>, PlayerId)> {
    let player_id = store.player_for_connection(connection_id)?;
    let handle = store.room_for_player(player_id)?;
    Some((handle, player_id))
}

fn ack_json(request_id: String, ack: RoomAck) -> String {
    ServerMessage::Ack { request_id, ack }.to_json()
}

fn connected_players(handle: &Arc<RoomHandle>) -> Vec<(ConnectionId, PlayerId)> {
    handle
        .room
        .lock()
        .unwrap()
        .players()
        .iter()
        .filter(|p| p.is_connected())
        .map(|p| (p.connection_id().clone(), p.id()))
        .collect()
}

fn connected_ids(handle: &Arc<RoomHandle>) -> Vec<ConnectionId> {
    handle
        .room
        .lock()
        .unwrap()
        .players()
        .iter()
        .filter(|p| p.is_connected())
        .map(|p| p.connection_id().clone())
        .collect()
}

/// Projects and pushes a fresh snapshot to every connected member of the
/// room. The room lock is released before any of this network I/O runs.
async fn broadcast(store: &Arc<RoomStore>, handle: &Arc<RoomHandle>, recently_opened: Option<RecentlyOpenedBox>) {
    let now_ms = dealroom_core::epoch_ms();
    for (connection_id, player_id) in connected_players(handle) {
        let snapshot = {
            let room = handle.room.lock().unwrap();
            project(&room, player_id, now_ms, recently_opened.clone())
        };
        let message = ServerMessage::GameStateUpdate { snapshot: Box::new(snapshot) };
        store.send_to(&connection_id, message.to_json());
    }
}

fn rank_final_entries(entries: Vec<FinalEntry>) -> Vec<LeaderEntry> {
    dealroom_rules::rank_leaderboard(entries, |e| e.points)
        .into_iter()
        .map(|(rank, e)| LeaderEntry {
            player_id: e.player_id.to_string(),
            player_name: e.player_name,
            amount: e.amount,
            points: e.points,
            was_box_value: e.was_box_value,
            rank,
        })
        .collect()
}

async fn push_provisional_leaderboard(store: &Arc<RoomStore>, handle: &Arc<RoomHandle>) {
    let leaderboard = {
        let room = handle.room.lock().unwrap();
        rank_final_entries(room.provisional_standings())
    };
    let message = ServerMessage::LeaderboardUpdate { leaderboard };
    let json = message.to_json();
    for connection_id in connected_ids(handle) {
        store.send_to(&connection_id, json.clone());
    }
}

/// Brings a newly (re)connected player up to speed on the leaderboard: the
/// final ranking if the game already ended, otherwise the in-progress
/// provisional one. Complements `broadcast`, which only carries game state.
async fn push_leaderboard_snapshot(store: &Arc<RoomStore>, handle: &Arc<RoomHandle>, connection_id: &str) {
    let room = handle.room.lock().unwrap();
    if room.is_finished() {
        let entries: Vec<FinalEntry> = room
            .players()
            .iter()
            .filter_map(|p| {
                let c = p.contestant()?;
                Some(FinalEntry {
                    player_id: p.id(),
                    player_name: p.display_name().to_string(),
                    amount: c.deal_amount.unwrap_or(0.0),
                    points: c.points,
                    was_box_value: c.is_last_standing,
                })
            })
            .collect();
        drop(room);
        let message = ServerMessage::GameEnded { leaderboard: rank_final_entries(entries) };
        store.send_to(connection_id, message.to_json());
    } else {
        let entries = room.provisional_standings();
        drop(room);
        let message = ServerMessage::LeaderboardUpdate { leaderboard: rank_final_entries(entries) };
        store.send_to(connection_id, message.to_json());
    }
}

async fn handle_create_room(store: &Arc<RoomStore>, connection_id: ConnectionId, request_id: String, player_name: String) {
    if player_name.trim().is_empty() {
        store.send_to(&connection_id, ack_json(request_id, RoomAck::err("Player name is required")));
        return;
    }
    let (handle, player_id) = store.create(connection_id.clone(), &player_name);
    let code = handle.room.lock().unwrap().code().to_string();
    store.send_to(&connection_id, ack_json(request_id, RoomAck::ok(code, player_id.to_string())));
    broadcast(store, &handle, None).await;
}

async fn handle_join_room(
    store: &Arc<RoomStore>,
    connection_id: ConnectionId,
    request_id: String,
    room_code: String,
    player_name: String,
    password: Option<String>,
    as_spectator: bool,
) {
    if room_code.trim().is_empty() {
        store.send_to(&connection_id, ack_json(request_id, RoomAck::err("Room code is required")));
        return;
    }
    if player_name.trim().is_empty() {
        store.send_to(&connection_id, ack_json(request_id, RoomAck::err("Player name is required")));
        return;
    }
    let code = room_code.trim().to_uppercase();
    match store.join(&code, connection_id.clone(), &player_name, password.as_deref(), as_spectator) {
        Ok((handle, player_id)) => {
            store.send_to(&connection_id, ack_json(request_id, RoomAck::ok(code, player_id.to_string())));
            broadcast(store, &handle, None).await;
            push_leaderboard_snapshot(store, &handle, &connection_id).await;
        }
        Err(err) => {
            store.send_to(&connection_id, ack_json(request_id, RoomAck::err(err.to_string())));
        }
    }
}

async fn handle_reconnect(store: &Arc<RoomStore>, connection_id: ConnectionId, request_id: String, player_id: String) {
    let parsed = uuid::Uuid::parse_str(&player_id).map(PlayerId::from);
    let Ok(player_id) = parsed else {
        store.send_to(&connection_id, ack_json(request_id, RoomAck::err("Player not found")));
        return;
    };
    match store.reconnect(player_id, connection_id.clone()) {
        Ok(handle) => {
            let code = handle.room.lock().unwrap().code().to_string();
            store.send_to(&connection_id, ack_json(request_id, RoomAck::ok_room_only(code)));
            broadcast(store, &handle, None).await;
            push_leaderboard_snapshot(store, &handle, &connection_id).await;
        }
        Err(err) => {
            store.send_to(&connection_id, ack_json(request_id, RoomAck::err(err.to_string())));
        }
    }
}

async fn handle_set_password(store: &Arc<RoomStore>, connection_id: &str, request_id: String, password: Option<String>) {
    let Some((handle, actor)) = resolve(store, connection_id) else {
        store.send_to(connection_id, ack_json(request_id, RoomAck::err("Room not found")));
        return;
    };
    let ok = store.set_password(&handle, actor, password);
    let ack = if ok { RoomAck::ok_bare() } else { RoomAck::err("Only the host can set the room password") };
    store.send_to(connection_id, ack_json(request_id, ack));
}

async fn handle_get_global_leaderboard(store: &Arc<RoomStore>, connection_id: &str, request_id: String) {
    let leaderboard = store.top_global();
    let message = ServerMessage::LeaderboardAck { request_id, success: true, leaderboard };
    store.send_to(connection_id, message.to_json());
}

async fn handle_open_box(store: &Arc<RoomStore>, handle: Arc<RoomHandle>, actor: PlayerId, box_number: u8) {
    let outcome = handle.room.lock().unwrap().open_box(actor, box_number);
    match outcome {
        OpenBoxOutcome::Rejected => {}
        OpenBoxOutcome::Opened { value, round_complete } => {
            broadcast(store, &handle, Some(RecentlyOpenedBox { box_number, value })).await;
            if round_complete {
                handle.timers.lock().unwrap().cancel_turn();
                schedule_round_pause(store.clone(), handle.clone());
            } else {
                sync_timers(store, handle.clone());
            }
        }
    }
}

async fn handle_deal_response(store: &Arc<RoomStore>, handle: Arc<RoomHandle>, actor: PlayerId, accepted: bool) {
    let outcome = handle.room.lock().unwrap().deal_response(actor, accepted);
    match outcome {
        DealOutcome::Rejected => {}
        DealOutcome::Recorded { all_responded } => {
            broadcast(store, &handle, None).await;
            push_provisional_leaderboard(store, &handle).await;
            if all_responded {
                resolve_offer_and_continue(store, handle).await;
            }
        }
    }
}

async fn handle_chat(store: &Arc<RoomStore>, handle: &Arc<RoomHandle>, actor: PlayerId, content: String) {
    let now_ms = dealroom_core::epoch_ms();
    let (message, code) = {
        let mut room = handle.room.lock().unwrap();
        let message = room.send_chat(actor, content, now_ms);
        (message, room.code().to_string())
    };
    let Some(message) = message else { return };
    let wire = ServerMessage::ChatMessage {
        id: message.id.to_string(),
        sender_id: message.sender_id.to_string(),
        sender_name: message.sender_name,
        content: message.content,
        timestamp_ms: message.timestamp_ms,
        room_code: code,
    };
    let json = wire.to_json();
    for connection_id in connected_ids(handle) {
        store.send_to(&connection_id, json.clone());
    }
}

/// Schedules the cosmetic pause between the round's last box and the
/// banker's call (`ROUND_END_PAUSE`). Left untracked in `RoomTimers`:
/// during the pause the room sits in `Playing` with no current turn, a
/// state no other inbound event can act on, so there is nothing to race
/// against and nothing worth cancelling.
fn schedule_round_pause(store: Arc<RoomStore>, handle: Arc<RoomHandle>) {
    tokio::spawn(async move {
        tokio::time::sleep(ROUND_END_PAUSE).await;
        begin_offer(&store, handle).await;
    });
}

async fn begin_offer(store: &Arc<RoomStore>, handle: Arc<RoomHandle>) {
    {
        let mut room = handle.room.lock().unwrap();
        if !room.phase().is_playing() {
            return;
        }
        let mut rng = rand::rng();
        room.start_offer(&mut rng);
    }
    broadcast(store, &handle, None).await;
    sync_timers(store, handle.clone());
}

async fn resolve_offer_and_continue(store: &Arc<RoomStore>, handle: Arc<RoomHandle>) {
    let resolution = handle.room.lock().unwrap().resolve_offer();
    match resolution {
        OfferResolution::NotReady => {}
        OfferResolution::NextRound => {
            handle.timers.lock().unwrap().cancel_offer();
            broadcast(store, &handle, None).await;
            let deadlocked = {
                let room = handle.room.lock().unwrap();
                room.phase().is_playing() && room.current_turn_player_id().is_none()
            };
            if deadlocked {
                // The fresh round's pre-turn deadlock check found no openable
                // box (every remaining box is someone's reserved personal
                // box); route straight to the next offer instead of leaving
                // the room armed with no turn and no timer.
                schedule_round_pause(store.clone(), handle.clone());
            } else {
                sync_timers(store, handle.clone());
            }
        }
        OfferResolution::LastStanding { .. } | OfferResolution::AllDealt => {
            finalize_game(store, handle).await;
        }
    }
}

async fn finalize_game(store: &Arc<RoomStore>, handle: Arc<RoomHandle>) {
    handle.timers.lock().unwrap().cancel_all();
    let entries = handle.room.lock().unwrap().finalize();
    for entry in &entries {
        store.update_global(entry.player_id, &entry.player_name, entry.points);
    }
    broadcast(store, &handle, None).await;
    let leaderboard = rank_final_entries(entries);
    let message = ServerMessage::GameEnded { leaderboard };
    let json = message.to_json();
    for connection_id in connected_ids(&handle) {
        store.send_to(&connection_id, json.clone());
    }
}

/// Called by the bridge when a connection drops. Marks the player
/// disconnected, then — if they were seated in a room — pushes an advisory
/// `player-left` to the remaining connections and a fresh `game-state-update`
/// so everyone's `isConnected` view catches up. A stale/never-seated
/// connection id resolves to nothing and this is a no-op.
pub async fn on_disconnect(store: Arc<RoomStore>, connection_id: ConnectionId) {
    let resolved = resolve(&store, &connection_id);
    store.handle_disconnect(&connection_id);
    let Some((handle, player_id)) = resolved else {
        return;
    };
    let message = ServerMessage::PlayerLeft { player_id: player_id.to_string() };
    let json = message.to_json();
    for remaining in connected_ids(&handle) {
        store.send_to(&remaining, json.clone());
    }
    broadcast(&store, &handle, None).await;
}

/// Called when a room's turn timer fires. The deadline guard inside
/// `Room::turn_timeout` makes this safe even if state moved on between the
/// sleep being armed and firing.
pub async fn on_turn_timeout(store: Arc<RoomStore>, handle: Arc<RoomHandle>, expected_player: PlayerId) {
    let outcome = handle.room.lock().unwrap().turn_timeout(expected_player);
    match outcome {
        TurnTimeoutOutcome::NoOp => {}
        TurnTimeoutOutcome::Advanced => {
            broadcast(&store, &handle, None).await;
            sync_timers(&store, handle.clone());
        }
        TurnTimeoutOutcome::RouteToOffer => {
            broadcast(&store, &handle, None).await;
            schedule_round_pause(store.clone(), handle.clone());
        }
    }
}

/// Called when a room's offer timer fires. Re-checks the phase before
/// acting: a replaced timer is aborted, but a task already past `.await`
/// when cancellation happens can still reach here, so the phase check is
/// the real guard.
pub async fn on_offer_timeout(store: Arc<RoomStore>, handle: Arc<RoomHandle>) {
    {
        let mut room = handle.room.lock().unwrap();
        if !room.phase().is_offer() {
            return;
        }
        room.apply_offer_timeout_penalties();
    }
    broadcast(&store, &handle, None).await;
    resolve_offer_and_continue(&store, handle).await;
}

enum Armed {
    Turn(PlayerId, Duration),
    Offer(Duration),
    None,
}

/// Synchronises this room's external `tokio` sleep tasks to whatever the
/// engine's internal deadline state now is. Called after every mutation
/// that might arm, clear, or replace a turn/offer deadline, rather than each
/// call site managing timers itself.
fn sync_timers(store: &Arc<RoomStore>, handle: Arc<RoomHandle>) {
    let armed = {
        let room = handle.room.lock().unwrap();
        match (room.current_turn_player_id(), room.turn_deadline()) {
            (Some(player_id), Some(deadline)) => Armed::Turn(player_id, deadline.remaining()),
            _ => match room.offer_deadline() {
                Some(deadline) => Armed::Offer(deadline.remaining()),
                None => Armed::None,
            },
        }
    };
    match armed {
        Armed::Turn(player_id, remaining) => {
            let store = store.clone();
            let task_handle = handle.clone();
            let task = tokio::spawn(async move {
                tokio::time::sleep(remaining).await;
                on_turn_timeout(store, task_handle, player_id).await;
            });
            handle.timers.lock().unwrap().arm_turn(task);
        }
        Armed::Offer(remaining) => {
            let store = store.clone();
            let task_handle = handle.clone();
            let task = tokio::spawn(async move {
                tokio::time::sleep(remaining).await;
                on_offer_timeout(store, task_handle).await;
            });
            handle.timers.lock().unwrap().arm_offer(task);
        }
        Armed::None => {
            handle.timers.lock().unwrap().cancel_all();
        }
    }
}
