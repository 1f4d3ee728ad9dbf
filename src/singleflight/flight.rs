use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use anyhow::{anyhow, Result};
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::watch;

/// Outcome shared between the owner and its waiters. The error side is the
/// rendered message so it can fan out to any number of callers.
type Outcome<T> = Result<T, String>;

enum Role<T> {
    /// First arrival for the key; runs the work and publishes the outcome.
    Owner(watch::Sender<Option<Outcome<T>>>),
    /// Later arrival; waits for the owner's outcome.
    Waiter(watch::Receiver<Option<Outcome<T>>>),
}

/// Deduplicates concurrent calls keyed by string.
///
/// The waiters' receiver is registered in the call map before the map lock
/// is released, so no arrival between registration and completion can miss
/// the outcome.
pub struct FlightGroup<T: Clone> {
    calls: Mutex<HashMap<String, watch::Receiver<Option<Outcome<T>>>>>,
}

/// Removes the call-map entry when the owner finishes, whichever way the
/// flight ended (value, error, panic, or the owner being dropped mid-run).
struct Cleanup<'a, T: Clone> {
    key: &'a str,
    calls: &'a Mutex<HashMap<String, watch::Receiver<Option<Outcome<T>>>>>,
}

impl<T: Clone> Drop for Cleanup<'_, T> {
    fn drop(&mut self) {
        self.calls.lock().remove(self.key);
    }
}

impl<T: Clone> FlightGroup<T> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `work` unless a flight for `key` is already open, in which case
    /// the call blocks until that flight completes and returns its outcome.
    pub async fn run<F>(&self, key: &str, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let role = {
            let mut calls = self.calls.lock();
            match calls.get(key) {
                Some(receiver) => Role::Waiter(receiver.clone()),
                None => {
                    let (sender, receiver) = watch::channel(None);
                    calls.insert(key.to_string(), receiver);
                    Role::Owner(sender)
                }
            }
        };

        match role {
            Role::Waiter(mut receiver) => {
                tracing::debug!(key, "joining in-flight call");
                loop {
                    if let Some(outcome) = receiver.borrow_and_update().clone() {
                        return outcome.map_err(|message| anyhow!(message));
                    }
                    if receiver.changed().await.is_err() {
                        // The owner was dropped before publishing anything.
                        return Err(anyhow!("in-flight call for {key} was abandoned"));
                    }
                }
            }
            Role::Owner(sender) => {
                let _cleanup = Cleanup {
                    key,
                    calls: &self.calls,
                };
                tracing::debug!(key, "starting new call");

                let outcome = match AssertUnwindSafe(work).catch_unwind().await {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(err)) => Err(format!("{err:#}")),
                    Err(panic) => {
                        let reason = panic_message(panic);
                        tracing::warn!(key, %reason, "recovered panic in flight");
                        Err(format!(
                            "call panicked and recovered in single flight: {reason}"
                        ))
                    }
                };

                let _ = sender.send(Some(outcome.clone()));
                outcome.map_err(|message| anyhow!(message))
            }
        }
    }

    /// Open flights right now; used by diagnostics and tests.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<T: Clone> Default for FlightGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
