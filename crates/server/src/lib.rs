//! The dealroom `actix-web` application: CORS, `/health`, a couple of
//! unauthenticated read endpoints, and the WebSocket upgrade route that
//! hands a connection off to `dealroom_hosting::bridge`.
//!
//! ## Submodules
//!
//! - [`config`] — process configuration, read once from the environment
//! - [`routes`] — HTTP handlers

mod config;
mod routes;

pub use config::Config;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::web;
use dealroom_hosting::RoomStore;
use dealroom_hosting::SweepConfig;
use std::sync::Arc;

/// Builds the room store, spawns the cleanup worker, and serves the
/// application until the process is interrupted.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let store = Arc::new(RoomStore::new(SweepConfig {
        waiting_ttl: config.room_waiting_ttl,
        finished_ttl: config.room_finished_ttl,
    }));

    tokio::spawn(dealroom_hosting::run_cleanup_worker(store.clone(), config.room_cleanup_interval));

    let bind_addr = format!("0.0.0.0:{}", config.port);
    log::info!("starting dealroom server on {bind_addr}");

    let cors_origins = config.cors_origins.clone();
    let data = web::Data::new(store);
    HttpServer::new(move || {
        let cors = if cors_origins.iter().any(|origin| origin == "*") {
            Cors::default().allow_any_origin().allow_any_method().allow_any_header()
        } else {
            cors_origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
                .allow_any_method()
                .allow_any_header()
        };
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(cors)
            .app_data(data.clone())
            .route("/health", web::get().to(routes::health))
            .route("/room/{code}/info", web::get().to(routes::room_info))
            .route("/leaderboard/global", web::get().to(routes::global_leaderboard))
            .route("/ws", web::get().to(routes::websocket))
    })
    .bind(bind_addr)?
    .run()
    .await?;
    Ok(())
}
