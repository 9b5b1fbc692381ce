use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use dealroom_gameroom::PhaseLabel;
use dealroom_hosting::RoomStore;
use std::sync::Arc;
use uuid::Uuid;

pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

#[derive(serde::Serialize)]
struct RoomInfo {
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    phase: Option<PhaseLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contestant_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    has_password: Option<bool>,
}

/// `GET /room/:code/info` — unauthenticated existence/phase probe so a
/// client can validate a room code and check for a password requirement
/// before attempting a `join-room` over the websocket.
pub async fn room_info(store: web::Data<Arc<RoomStore>>, path: web::Path<String>) -> impl Responder {
    let code = path.into_inner().trim().to_uppercase();
    let Some(handle) = store.room(&code) else {
        return HttpResponse::Ok().json(RoomInfo { exists: false, phase: None, contestant_count: None, has_password: None });
    };
    let room = handle.room.lock().unwrap();
    HttpResponse::Ok().json(RoomInfo {
        exists: true,
        phase: Some(room.phase_label()),
        contestant_count: Some(room.contestant_count()),
        has_password: Some(room.has_password()),
    })
}

/// `GET /leaderboard/global` — plain HTTP read of the process-lifetime
/// leaderboard, for dashboards that don't want to open a websocket just to
/// send `get-global-leaderboard`.
pub async fn global_leaderboard(store: web::Data<Arc<RoomStore>>) -> impl Responder {
    HttpResponse::Ok().json(store.top_global())
}

/// `GET /ws` — upgrades to a websocket connection and hands it to the
/// bridge under a freshly minted connection id.
pub async fn websocket(req: HttpRequest, body: web::Payload, store: web::Data<Arc<RoomStore>>) -> actix_web::Result<HttpResponse> {
    let (response, session, stream) = actix_ws::handle(&req, body)?;
    let connection_id = Uuid::now_v7().to_string();
    let store = store.get_ref().clone();
    actix_web::rt::spawn(dealroom_hosting::bridge(store, connection_id, session, stream));
    Ok(response)
}
