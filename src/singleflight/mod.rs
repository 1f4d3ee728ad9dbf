//! Duplicate Suppression Module
//!
//! Collapses concurrent loads of the same key into a single in-flight call.
//!
//! ## Core Concepts
//! - **One flight per key**: The first caller becomes the owner and runs the
//!   work; everyone else arriving while the flight is open waits for the
//!   owner's outcome and receives the same result or error.
//! - **Fault containment**: A panic inside the work is caught and delivered
//!   to every waiter as an error, so nobody is left blocked.
//! - **No memoization**: The key is forgotten the moment the flight
//!   completes. Back-to-back misses outside one in-flight window each run
//!   the work again.

pub mod flight;

pub use flight::FlightGroup;

#[cfg(test)]
mod tests;
