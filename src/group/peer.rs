use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// Loads a value from the application's backing store on a cache miss.
///
/// Supplied by the application when a group is created; the group calls it
/// only for keys this node owns.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, key: &str) -> Result<Vec<u8>>;
}

type LoaderFuture = Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send>>;

/// Closure form of [`Loader`], so a plain async function can back a group
/// without a dedicated trait impl.
///
/// ```ignore
/// let loader = LoaderFn::new(|key| async move { Ok(key.into_bytes()) });
/// ```
pub struct LoaderFn {
    inner: Arc<dyn Fn(String) -> LoaderFuture + Send + Sync>,
}

impl LoaderFn {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<u8>>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |key| Box::pin(f(key))),
        }
    }
}

#[async_trait]
impl Loader for LoaderFn {
    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        (self.inner)(key.to_string()).await
    }
}

/// Fetches a (group, key) entry from one specific remote peer. The transport
/// behind it is opaque to the orchestration layer.
#[async_trait]
pub trait PeerFetcher: Send + Sync {
    async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>>;
}

/// Maps a key to the peer that owns it.
pub trait PeerPicker: Send + Sync {
    /// Returns the fetcher for the remote owner of `key`, or `None` when the
    /// local node owns it (the picker never hands back the local node).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>>;

    /// Registers peer endpoints with the picker. The local node must always
    /// stay registered; an empty slice just (re)asserts that.
    fn add_peers(&self, peers: &[String]) -> Result<()>;
}
