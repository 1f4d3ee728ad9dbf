//! Peer Wire Protocol
//!
//! Defines the endpoint layout and Data Transfer Objects for internode
//! traffic. Cache values travel as raw octet streams; management operations
//! use JSON bodies.

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Path prefix every peer base URL ends with
/// (`http://host:port/_peercache/`).
pub const BASE_PATH: &str = "/_peercache/";

/// Cache lookup endpoint, axum route form: serves
/// `GET /_peercache/{group}/{key}` as an octet stream.
pub const ROUTE_CACHE_GET: &str = "/_peercache/:group/:key";

/// Management endpoint asking a node to drop peers from its pool.
pub const ROUTE_PURGE: &str = "/_peercache/purge";

/// Diagnostics endpoint reporting node and cache occupancy.
pub const ROUTE_STATS: &str = "/stats";

// --- Data Transfer Objects ---

/// Asks the receiving node to remove the named peers from its own pool.
///
/// Sent during controlled topology changes so every node stops routing to a
/// departed peer.
#[derive(Debug, Serialize, Deserialize)]
pub struct PurgeRequest {
    /// Peer base URLs to remove.
    pub peers: Vec<String>,
}

/// Per-peer outcome of a purge. Any entry in `failed` means the overall
/// request is reported as a server error.
#[derive(Debug, Serialize, Deserialize)]
pub struct PurgeResponse {
    pub removed: usize,
    /// Peers that could not be removed, as `"<peer>: <reason>"`.
    pub failed: Vec<String>,
}

/// Cache occupancy of one group on this node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStats {
    pub name: String,
    pub main_entries: usize,
    pub main_bytes: usize,
    pub hot_entries: usize,
    pub hot_bytes: usize,
}

/// Diagnostics snapshot for one node.
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeStatsResponse {
    pub self_url: String,
    pub peer_count: usize,
    pub groups: Vec<GroupStats>,
    pub cpu_usage: f32,
    pub mem_used_mb: u64,
    pub mem_total_mb: u64,
}
