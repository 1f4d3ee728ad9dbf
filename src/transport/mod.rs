//! HTTP Peer Transport Module
//!
//! Gives the orchestration layer its view of the fleet: a pool of peer base
//! URLs arranged on a consistent-hash ring, an HTTP client per peer, and the
//! axum handlers that serve cache lookups to other nodes.
//!
//! ## Core Concepts
//! - **`HttpPool`**: Implements `PeerPicker`. Owns the ring and one
//!   `PeerClient` per registered peer; the local node is always a ring
//!   member, so `pick_peer` can recognise keys it owns itself.
//! - **`PeerClient`**: Implements `PeerFetcher` over `reqwest` with a short
//!   request deadline; a slow peer is an error, not a hang.
//! - **Handlers**: Translate HTTP requests into `Group::get` calls and pool
//!   management operations, in both directions of the peer protocol.

pub mod client;
pub mod handlers;
pub mod pool;
pub mod protocol;

pub use client::PeerClient;
pub use handlers::router;
pub use pool::HttpPool;
