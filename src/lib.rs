//! Distributed Read-Through Cache Library
//!
//! This library crate defines the core modules that make up a cooperative
//! caching fleet. It serves as the foundation for the node executable
//! (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of five loosely coupled subsystems:
//!
//! - **`cache`**: The per-node local store. An LRU-K (K=2) engine with a
//!   probationary FIFO in front of the main LRU, accounted in bytes.
//! - **`ring`**: The key-placement layer. A consistent-hash ring with salted
//!   virtual nodes maps every key to exactly one owning peer.
//! - **`singleflight`**: The duplicate-suppression layer. Concurrent loads of
//!   the same key collapse into a single in-flight call.
//! - **`group`**: The orchestration layer. Composes cache, ring and
//!   singleflight behind `Group::get`, routing misses to the owning peer or
//!   to the application's loader.
//! - **`transport`**: The HTTP peer pool. Serves cache lookups to other
//!   nodes and fetches from remote owners over `reqwest`.

pub mod cache;
pub mod group;
pub mod ring;
pub mod singleflight;
pub mod transport;
