//! HTTP request handlers for the management API.
//!
//! Every handler answers with HTTP 200 and a JSON body; operational
//! failures ride in the [`ActionResponse`] envelope rather than status
//! codes, which keeps the polling frontend's error handling in one place.

use crate::config::DEFAULT_LOG_VIEW_LINES;
use crate::data::{BackupManager, ModCatalog, PropertiesStore, RosterStore};
use crate::server::Supervisor;
use crate::web::types::{
    ActionResponse, BanRequest, CommandRequest, IpRequest, KillAllResponse, LogsQuery,
    LogsResponse, NameRequest, OpRequest, PropertyUpdates, StopRequest,
};

use actix_web::{
    HttpResponse, Responder,
    web::{Data, Json, Query},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing;

/// Shared state handed to every handler via Actix `Data`.
#[derive(Clone)]
pub struct AppState {
    pub supervisor: Arc<Supervisor>,
    pub properties: Arc<PropertiesStore>,
    pub roster: Arc<RosterStore>,
    pub backups: Arc<BackupManager>,
    pub mods: Arc<ModCatalog>,
}

/// Property keys surfaced on the status endpoint.
const STATUS_PROPERTY_KEYS: &[&str] = &[
    "motd",
    "max-players",
    "server-port",
    "gamemode",
    "difficulty",
    "level-name",
];

#[derive(Serialize)]
struct StatusBody {
    #[serde(flatten)]
    report: crate::server::StatusReport,
    properties: serde_json::Value,
}

/// `GET /api/status`
pub async fn get_status(state: Data<AppState>) -> impl Responder {
    let report = state.supervisor.status().await;

    let mut properties = serde_json::Map::new();
    for key in STATUS_PROPERTY_KEYS {
        if let Some(value) = state.properties.get(key) {
            properties.insert(key.to_string(), json!(value));
        }
    }

    HttpResponse::Ok().json(StatusBody {
        report,
        properties: serde_json::Value::Object(properties),
    })
}

/// `POST /api/server/start`
pub async fn start_server(state: Data<AppState>) -> impl Responder {
    let response = match state.supervisor.start().await {
        Ok(pid) => ActionResponse::ok(format!("Server started, PID: {}", pid)),
        Err(e) => ActionResponse::fail(e.to_string()),
    };
    HttpResponse::Ok().json(response)
}

/// `POST /api/server/stop`
///
/// The body is optional; when present, `grace_secs` overrides the
/// configured grace period for this stop only.
pub async fn stop_server(
    state: Data<AppState>,
    body: Option<Json<StopRequest>>,
) -> impl Responder {
    let grace = body
        .and_then(|b| b.grace_secs)
        .map(Duration::from_secs);
    let response = match state.supervisor.stop(grace).await {
        Ok(()) => ActionResponse::ok("Server stopped"),
        Err(e) => ActionResponse::fail(e.to_string()),
    };
    HttpResponse::Ok().json(response)
}

/// `POST /api/server/restart`
pub async fn restart_server(
    state: Data<AppState>,
    body: Option<Json<StopRequest>>,
) -> impl Responder {
    let grace = body
        .and_then(|b| b.grace_secs)
        .map(Duration::from_secs);
    let response = match state.supervisor.restart(grace).await {
        Ok(pid) => ActionResponse::ok(format!("Server restarted, PID: {}", pid)),
        Err(e) => ActionResponse::fail(e.to_string()),
    };
    HttpResponse::Ok().json(response)
}

/// `POST /api/server/command`
pub async fn send_command(
    state: Data<AppState>,
    body: Json<CommandRequest>,
) -> impl Responder {
    let command = body.command.trim();
    if command.is_empty() {
        return HttpResponse::Ok().json(ActionResponse::fail("Command is empty"));
    }
    let response = match state.supervisor.send_command(command).await {
        Ok(()) => ActionResponse::ok(format!("Command sent: {}", command)),
        Err(e) => ActionResponse::fail(e.to_string()),
    };
    HttpResponse::Ok().json(response)
}

/// `POST /api/server/kill-all`
///
/// Always succeeds at this layer; the sweep is best effort.
pub async fn kill_all(state: Data<AppState>) -> impl Responder {
    let killed = state.supervisor.kill_all().await;
    tracing::warn!(killed = killed, "Kill-all requested over HTTP");
    HttpResponse::Ok().json(KillAllResponse {
        success: true,
        message: format!("Killed {} process(es)", killed),
        killed,
    })
}

/// `GET /api/logs`
///
/// With `since`, returns only lines appended after that fingerprint so
/// pollers transfer deltas. Without it, returns the tail.
pub async fn get_logs(state: Data<AppState>, query: Query<LogsQuery>) -> impl Responder {
    let logs = state.supervisor.logs();
    let (lines, fingerprint) = match query.since {
        Some(since) => logs.read_since(since),
        None => logs.read_tail(query.lines.unwrap_or(DEFAULT_LOG_VIEW_LINES)),
    };
    HttpResponse::Ok().json(LogsResponse { lines, fingerprint })
}

/// `GET /api/config`
pub async fn get_config(state: Data<AppState>) -> impl Responder {
    let mut properties = serde_json::Map::new();
    for (key, value) in state.properties.all() {
        properties.insert(key, json!(value));
    }
    HttpResponse::Ok().json(serde_json::Value::Object(properties))
}

/// `POST /api/config`
///
/// The body is a flat `{key: value}` map; each entry is applied
/// independently and gets its own result, so one unknown key does not
/// abort the rest.
pub async fn update_config(
    state: Data<AppState>,
    body: Json<PropertyUpdates>,
) -> impl Responder {
    let results: Vec<ActionResponse> = body
        .iter()
        .map(|(key, value)| ActionResponse::from_result(state.properties.update(key, value)))
        .collect();
    HttpResponse::Ok().json(results)
}

/// `GET /api/whitelist`
pub async fn get_whitelist(state: Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.roster.whitelist())
}

/// `POST /api/whitelist`
pub async fn add_whitelist(state: Data<AppState>, body: Json<NameRequest>) -> impl Responder {
    let response =
        ActionResponse::from_result(state.roster.add_whitelist(&body.name, &state.properties));
    HttpResponse::Ok().json(response)
}

/// `DELETE /api/whitelist`
pub async fn remove_whitelist(state: Data<AppState>, body: Json<NameRequest>) -> impl Responder {
    let response = ActionResponse::from_result(state.roster.remove_whitelist(&body.name));
    HttpResponse::Ok().json(response)
}

/// `GET /api/ops`
pub async fn get_ops(state: Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.roster.ops())
}

/// `POST /api/ops`
pub async fn add_op(state: Data<AppState>, body: Json<OpRequest>) -> impl Responder {
    let response = ActionResponse::from_result(state.roster.add_op(&body.name, body.level));
    HttpResponse::Ok().json(response)
}

/// `DELETE /api/ops`
pub async fn remove_op(state: Data<AppState>, body: Json<NameRequest>) -> impl Responder {
    let response = ActionResponse::from_result(state.roster.remove_op(&body.name));
    HttpResponse::Ok().json(response)
}

/// `GET /api/banned-players`
pub async fn get_banned_players(state: Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.roster.banned_players())
}

/// `POST /api/banned-players`
pub async fn ban_player(state: Data<AppState>, body: Json<BanRequest>) -> impl Responder {
    let response =
        ActionResponse::from_result(state.roster.ban_player(&body.name, body.reason.as_deref()));
    HttpResponse::Ok().json(response)
}

/// `DELETE /api/banned-players`
pub async fn unban_player(state: Data<AppState>, body: Json<NameRequest>) -> impl Responder {
    let response = ActionResponse::from_result(state.roster.unban_player(&body.name));
    HttpResponse::Ok().json(response)
}

/// `GET /api/banned-ips`
pub async fn get_banned_ips(state: Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.roster.banned_ips())
}

/// `POST /api/banned-ips`
pub async fn ban_ip(state: Data<AppState>, body: Json<IpRequest>) -> impl Responder {
    let response =
        ActionResponse::from_result(state.roster.ban_ip(&body.ip, body.reason.as_deref()));
    HttpResponse::Ok().json(response)
}

/// `DELETE /api/banned-ips`
pub async fn unban_ip(state: Data<AppState>, body: Json<IpRequest>) -> impl Responder {
    let response = ActionResponse::from_result(state.roster.unban_ip(&body.ip));
    HttpResponse::Ok().json(response)
}

/// `GET /api/mods`
pub async fn get_mods(state: Data<AppState>) -> impl Responder {
    match state.mods.list() {
        Ok(mods) => HttpResponse::Ok().json(mods),
        Err(e) => HttpResponse::Ok().json(ActionResponse::fail(e.to_string())),
    }
}

/// `DELETE /api/mods`
pub async fn remove_mod(state: Data<AppState>, body: Json<NameRequest>) -> impl Responder {
    let response = ActionResponse::from_result(state.mods.remove(&body.name));
    HttpResponse::Ok().json(response)
}

/// `GET /api/backups`
pub async fn get_backups(state: Data<AppState>) -> impl Responder {
    match state.backups.list() {
        Ok(backups) => HttpResponse::Ok().json(backups),
        Err(e) => HttpResponse::Ok().json(ActionResponse::fail(e.to_string())),
    }
}

/// `POST /api/backups`
///
/// Archiving a large world is filesystem-bound, so it runs on the
/// blocking pool instead of stalling a worker.
pub async fn create_backup(state: Data<AppState>) -> impl Responder {
    let backups = Arc::clone(&state.backups);
    let result = tokio::task::spawn_blocking(move || backups.create()).await;
    let response = match result {
        Ok(Ok(info)) => ActionResponse::ok(format!("World backed up to {}", info.name)),
        Ok(Err(e)) => ActionResponse::fail(e.to_string()),
        Err(e) => ActionResponse::fail(format!("Backup task failed: {}", e)),
    };
    HttpResponse::Ok().json(response)
}

/// `DELETE /api/backups`
pub async fn delete_backup(state: Data<AppState>, body: Json<NameRequest>) -> impl Responder {
    let response = ActionResponse::from_result(state.backups.delete(&body.name));
    HttpResponse::Ok().json(response)
}
