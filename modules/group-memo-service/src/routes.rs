//! Axum route handlers for the group memo RPC API.

use crate::bot::MemoBot;
use crate::db::Db;
use crate::error::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use group_memo_types::*;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

pub struct AppState {
    pub db: Arc<Db>,
    pub bot: Arc<MemoBot>,
    pub start_time: Instant,
    pub discord_connected: Arc<AtomicBool>,
}

type RpcResult<T> = (StatusCode, Json<RpcResponse<T>>);

fn respond<T: Serialize>(result: Result<T>) -> RpcResult<T> {
    match result {
        Ok(data) => (StatusCode::OK, Json(RpcResponse::ok(data))),
        Err(e) if e.is_validation() => (StatusCode::BAD_REQUEST, Json(RpcResponse::err(e.to_string()))),
        Err(e) => {
            log::error!("RPC: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(RpcResponse::err(e.to_string())))
        }
    }
}

// POST /rpc/memos/list
pub async fn list_memos(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListMemosRequest>,
) -> RpcResult<Vec<MemoView>> {
    respond(state.db.list(&req.channel_id).map(MemoView::numbered))
}

// POST /rpc/memos/add
pub async fn add_memo(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddMemoRequest>,
) -> RpcResult<Memo> {
    let _lane = state.bot.lanes.acquire(&req.channel_id).await;
    state.bot.log_op(format_args!("[RPC Add] channel {}", req.channel_id));
    respond(state.db.add(&req.channel_id, &req.content))
}

// POST /rpc/memos/delete
pub async fn delete_memo(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MemoPositionRequest>,
) -> RpcResult<Memo> {
    let _lane = state.bot.lanes.acquire(&req.channel_id).await;
    state.bot.log_op(format_args!(
        "[RPC Delete] position {} in channel {}",
        req.position, req.channel_id
    ));
    respond(state.db.remove_at(&req.channel_id, req.position))
}

// POST /rpc/memos/extract
pub async fn extract_memo(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MemoPositionRequest>,
) -> RpcResult<String> {
    respond(state.db.extract_at(&req.channel_id, req.position))
}

// POST /rpc/memos/clear
pub async fn clear_memos(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClearMemosRequest>,
) -> RpcResult<usize> {
    if req.confirmation.trim() != state.bot.gate.token {
        return (
            StatusCode::BAD_REQUEST,
            Json(RpcResponse::err(
                "Clearing requires `confirmation` to equal the configured confirmation token",
            )),
        );
    }
    let _lane = state.bot.lanes.acquire(&req.channel_id).await;
    state.bot.log_op(format_args!("[RPC Clear] channel {}", req.channel_id));
    respond(state.db.clear(&req.channel_id))
}

// GET /rpc/stats
pub async fn stats(State(state): State<Arc<AppState>>) -> RpcResult<MemoStats> {
    respond(state.db.get_stats())
}

// GET /rpc/status
pub async fn status(State(state): State<Arc<AppState>>) -> RpcResult<ServiceStatus> {
    let stats = state.db.get_stats().ok();
    (
        StatusCode::OK,
        Json(RpcResponse::ok(ServiceStatus {
            running: true,
            uptime_secs: state.start_time.elapsed().as_secs(),
            total_memos: stats.as_ref().map(|s| s.total_memos).unwrap_or(0),
            channel_count: stats.as_ref().map(|s| s.channel_count).unwrap_or(0),
            pending_confirmations: state.bot.prompts.pending_count(),
            channel_lanes: state.bot.lanes.lane_count(),
            discord_connected: state.discord_connected.load(Ordering::Relaxed),
        })),
    )
}

// POST /rpc/backup/export
pub async fn backup_export(State(state): State<Arc<AppState>>) -> RpcResult<Vec<BackupEntry>> {
    respond(state.db.export_all())
}

// POST /rpc/backup/restore
pub async fn backup_restore(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BackupRestoreRequest>,
) -> RpcResult<usize> {
    respond(state.db.clear_and_restore(&req.memos))
}
