//! Route handlers and router assembly.
//!
//! Every `/api` route sits behind the auth middleware (a pass-through
//! when no credentials are configured). Responses mirror the dashboard
//! frontend's expectations: small ad-hoc JSON objects built per
//! endpoint rather than one envelope type.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use labdeck_core::types::{CheckSpec, HealthResult, Host, ScheduleState};
use labdeck_scan::{probe, run_discovery};
use labdeck_store::ConfigStore;

use crate::auth::require_auth;
use crate::error::ApiError;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/health", post(health))
        .route("/api/scan", post(scan))
        .route("/api/discoveries", get(discoveries))
        .route("/api/schedule", get(get_schedule).post(set_schedule))
        .route("/api/validate", post(validate))
        .route("/api/servers", get(servers))
        .route("/api/save-config", post(save_config))
        .route("/api/save-config-with-backup", post(save_config_with_backup))
        .route("/api/backups", get(list_backups))
        .route("/api/backups/{name}", get(download_backup))
        .route("/api/restore-config", post(restore_config))
        .layer(from_fn_with_state(state.clone(), require_auth));

    api.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ── Probing and discovery ─────────────────────────────────────────

#[derive(Deserialize)]
struct HealthRequest {
    target: String,
    checks: Vec<CheckSpec>,
}

async fn health(Json(req): Json<HealthRequest>) -> Json<HealthResult> {
    Json(probe::evaluate(&req.target, &req.checks).await)
}

#[derive(Deserialize)]
struct ScanRequest {
    subnet: String,
    #[serde(default = "default_top_ports")]
    top_ports: u16,
}

fn default_top_ports() -> u16 {
    100
}

async fn scan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScanRequest>,
) -> Result<Json<Value>, ApiError> {
    // Slash means CIDR; anything else is passed through as an nmap
    // target expression (single address, hostname, range).
    if req.subnet.contains('/') && req.subnet.parse::<ipnet::IpNet>().is_err() {
        return Err(ApiError::BadRequest(format!(
            "Invalid CIDR expression: {}",
            req.subnet
        )));
    }

    let hosts = run_discovery(&state.engine, &state.cache, &req.subnet, req.top_ports).await?;
    Ok(Json(json!({
        "count": hosts.len(),
        "hosts": hosts,
        "ts": Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    })))
}

async fn discoveries(State(state): State<Arc<AppState>>) -> Json<Vec<Host>> {
    Json(state.cache.load())
}

// ── Scheduling ────────────────────────────────────────────────────

async fn get_schedule(State(state): State<Arc<AppState>>) -> Json<ScheduleState> {
    Json(state.scheduler.schedule())
}

async fn set_schedule(
    State(state): State<Arc<AppState>>,
    Json(cfg): Json<ScheduleState>,
) -> Result<Json<Value>, ApiError> {
    if cfg.subnet.trim().is_empty() {
        return Err(ApiError::BadRequest("subnet must not be empty".to_string()));
    }
    if !(1..=1000).contains(&cfg.top_ports) {
        return Err(ApiError::BadRequest(
            "top_ports must be between 1 and 1000".to_string(),
        ));
    }

    state.scheduler.apply(cfg);
    Ok(Json(json!({ "ok": true, "schedule": state.scheduler.schedule() })))
}

// ── Topology document ─────────────────────────────────────────────

async fn validate(Json(doc): Json<Value>) -> Response {
    match ConfigStore::validate(&doc) {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "error": e.to_string() })),
        )
            .into_response(),
    }
}

async fn servers(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.store.live()?))
}

async fn save_config(
    State(state): State<Arc<AppState>>,
    Json(doc): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state.store.save(&doc)?;
    Ok(Json(json!({
        "ok": true,
        "path": state.store.live_path().display().to_string(),
    })))
}

async fn save_config_with_backup(
    State(state): State<Arc<AppState>>,
    Json(doc): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let backup = state.store.save_with_backup(&doc)?;
    Ok(Json(json!({
        "ok": true,
        "path": state.store.live_path().display().to_string(),
        "backup": backup,
    })))
}

// ── Backups ───────────────────────────────────────────────────────

async fn list_backups(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let files = state.store.list_backups()?;
    Ok(Json(json!({ "count": files.len(), "files": files })))
}

async fn download_backup(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = state.store.read_backup(&name)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], bytes).into_response())
}

#[derive(Deserialize)]
struct RestoreRequest {
    name: String,
}

async fn restore_config(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RestoreRequest>,
) -> Result<Json<Value>, ApiError> {
    state.store.restore(&req.name)?;
    Ok(Json(json!({ "ok": true, "restored": req.name })))
}
