//! Key Placement Module
//!
//! Implements a consistent-hash ring that maps any key string to exactly one
//! owning peer, so every node in the fleet computes the same ownership
//! independently.
//!
//! ## Core Concepts
//! - **Virtual nodes**: Each peer occupies several positions on the ring
//!   (four by default), which smooths the load distribution even with a
//!   handful of peers.
//! - **Salted hashing**: Virtual-node positions are derived from the peer
//!   name plus a random salt; a colliding placement is retried with a fresh
//!   salt instead of silently stacking two peers on one position.
//! - **Minimal reshuffling**: Adding or removing a peer only moves the keys
//!   adjacent to its virtual nodes.

pub mod consistent;

pub use consistent::HashRing;
