//! Group Orchestration Module
//!
//! Composes the local cache, the consistent-hash ring (through the peer
//! pool) and the singleflight coordinator behind a single read-through
//! `Group::get`.
//!
//! ## Read Path
//! 1. Look the key up in the main cache; a hit returns immediately.
//! 2. On a miss, enter singleflight so one load runs per key at a time.
//! 3. Inside the flight, ask the peer picker for the key's owner. A remote
//!    owner is fetched over the peer contract; the result occasionally lands
//!    in the hot cache. When the local node owns the key, the application
//!    loader runs and the result is admitted into the main cache.
//!
//! ## Submodules
//! - **`peer`**: Capability interfaces the orchestration consumes: `Loader`,
//!   `PeerFetcher`, `PeerPicker`, plus a closure adapter for loaders.
//! - **`service`**: The `Group` itself and the process-wide registry.

pub mod peer;
pub mod service;

pub use peer::{Loader, LoaderFn, PeerFetcher, PeerPicker};
pub use service::{get_group, list_groups, new_group, Group};
