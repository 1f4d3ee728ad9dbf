//! Peer API Handlers
//!
//! HTTP endpoints that expose this node's cache and pool management to the
//! rest of the fleet. Cache responses are raw octet streams so values stay
//! opaque end to end; management and diagnostics speak JSON.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use sysinfo::System;

use crate::group::get_group;

use super::pool::HttpPool;
use super::protocol::{
    GroupStats, NodeStatsResponse, PurgeRequest, PurgeResponse, ROUTE_CACHE_GET, ROUTE_PURGE,
    ROUTE_STATS,
};

/// Builds the node's HTTP router over a shared peer pool.
pub fn router(pool: Arc<HttpPool>) -> Router {
    Router::new()
        .route(ROUTE_PURGE, post(handle_purge_peers))
        .route(ROUTE_CACHE_GET, get(handle_cache_get))
        .route(ROUTE_STATS, get(handle_stats))
        .layer(Extension(pool))
}

/// Cache lookup on behalf of a client or another node.
///
/// Runs the full read path of the named group, so a lookup landing on a
/// non-owner is forwarded to the owner transparently.
pub async fn handle_cache_get(Path((group_name, key)): Path<(String, String)>) -> Response {
    if group_name.is_empty() || key.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "group name / key should be not null\n",
        )
            .into_response();
    }

    let Some(group) = get_group(&group_name) else {
        return (StatusCode::BAD_REQUEST, "group name doesn't exist\n").into_response();
    };

    match group.get(&key).await {
        Ok(view) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            view.to_vec(),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(group = %group_name, key = %key, error = %format!("{err:#}"), "cache get failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}\n")).into_response()
        }
    }
}

/// Removes peers from the local pool on request.
///
/// Reports per-peer failures; any failure turns the whole response into a
/// server error so the caller knows the topology change did not fully land.
pub async fn handle_purge_peers(
    Extension(pool): Extension<Arc<HttpPool>>,
    Json(req): Json<PurgeRequest>,
) -> (StatusCode, Json<PurgeResponse>) {
    let mut removed = 0usize;
    let mut failed = Vec::new();

    for peer in &req.peers {
        match pool.remove_peers(std::slice::from_ref(peer)) {
            Ok(()) => removed += 1,
            Err(err) => failed.push(format!("{peer}: {err:#}")),
        }
    }

    let status = if failed.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(PurgeResponse { removed, failed }))
}

/// Node diagnostics: pool topology, per-group cache occupancy, and process
/// resource usage.
pub async fn handle_stats(Extension(pool): Extension<Arc<HttpPool>>) -> Json<NodeStatsResponse> {
    let groups = crate::group::list_groups()
        .into_iter()
        .map(|group| GroupStats {
            name: group.name().to_string(),
            main_entries: group.main_cache_len(),
            main_bytes: group.main_cache_bytes(),
            hot_entries: group.hot_cache_len(),
            hot_bytes: group.hot_cache_bytes(),
        })
        .collect();

    let mut sys = System::new_all();
    sys.refresh_cpu();
    sys.refresh_memory();
    let cpu_usage = sys.global_cpu_info().cpu_usage();
    // sysinfo returns bytes for memory values.
    let mem_total_mb = sys.total_memory() / (1024 * 1024);
    let mem_used_mb = sys.used_memory() / (1024 * 1024);

    Json(NodeStatsResponse {
        self_url: pool.self_url().to_string(),
        peer_count: pool.peer_count(),
        groups,
        cpu_usage,
        mem_used_mb,
        mem_total_mb,
    })
}
