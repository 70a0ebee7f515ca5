//! HTTP management API built on Actix Web.
//!
//! The frontend polls these endpoints; there is no push channel. All
//! routes live under `/api` and answer JSON. CORS is wide open since the
//! manager binds to a trusted interface.

pub mod handlers;
pub mod types;

pub use handlers::AppState;
pub use types::{ActionResponse, LogsResponse};

use crate::config::HttpConfig;
use crate::error::{Error, Result};

use actix_cors::Cors;
use actix_web::{
    App, HttpServer, middleware,
    web::{self, Data},
};
use std::net::ToSocketAddrs;
use tracing;

/// Build and bind the management API server.
///
/// Returns the Actix server future; the caller decides whether to await
/// it directly or spawn it.
pub fn build_server(config: &HttpConfig, state: AppState) -> Result<actix_web::dev::Server> {
    let addr_str = format!("{}:{}", config.address, config.port);
    let addr = addr_str
        .to_socket_addrs()
        .map_err(|e| Error::Other(format!("Failed to parse socket address: {}", e)))?
        .next()
        .ok_or_else(|| Error::Other(format!("Could not resolve socket address: {}", addr_str)))?;

    tracing::info!(address = %addr_str, workers = config.workers, "Starting management API server");

    let state = Data::new(state);
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .route("/api/status", web::get().to(handlers::get_status))
            .route("/api/server/start", web::post().to(handlers::start_server))
            .route("/api/server/stop", web::post().to(handlers::stop_server))
            .route(
                "/api/server/restart",
                web::post().to(handlers::restart_server),
            )
            .route(
                "/api/server/command",
                web::post().to(handlers::send_command),
            )
            .route("/api/server/kill-all", web::post().to(handlers::kill_all))
            .route("/api/logs", web::get().to(handlers::get_logs))
            .route("/api/config", web::get().to(handlers::get_config))
            .route("/api/config", web::post().to(handlers::update_config))
            .route("/api/whitelist", web::get().to(handlers::get_whitelist))
            .route("/api/whitelist", web::post().to(handlers::add_whitelist))
            .route(
                "/api/whitelist",
                web::delete().to(handlers::remove_whitelist),
            )
            .route("/api/ops", web::get().to(handlers::get_ops))
            .route("/api/ops", web::post().to(handlers::add_op))
            .route("/api/ops", web::delete().to(handlers::remove_op))
            .route(
                "/api/banned-players",
                web::get().to(handlers::get_banned_players),
            )
            .route("/api/banned-players", web::post().to(handlers::ban_player))
            .route(
                "/api/banned-players",
                web::delete().to(handlers::unban_player),
            )
            .route("/api/banned-ips", web::get().to(handlers::get_banned_ips))
            .route("/api/banned-ips", web::post().to(handlers::ban_ip))
            .route("/api/banned-ips", web::delete().to(handlers::unban_ip))
            .route("/api/mods", web::get().to(handlers::get_mods))
            .route("/api/mods", web::delete().to(handlers::remove_mod))
            .route("/api/backups", web::get().to(handlers::get_backups))
            .route("/api/backups", web::post().to(handlers::create_backup))
            .route("/api/backups", web::delete().to(handlers::delete_backup))
    })
    .workers(config.workers)
    .bind(addr)
    .map_err(|e| Error::Other(format!("Failed to bind server: {}", e)))?
    .run();

    Ok(server)
}
