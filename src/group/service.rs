use std::sync::{Arc, OnceLock};

use anyhow::{bail, Result};
use dashmap::DashMap;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::cache::{ByteView, LocalCache};
use crate::singleflight::FlightGroup;

use super::peer::{Loader, PeerFetcher, PeerPicker};

/// One peer-served result in ten is kept in the hot cache.
const HOT_SAMPLE_ONE_IN: u32 = 10;

lazy_static! {
    static ref GROUPS: DashMap<String, Arc<Group>> = DashMap::new();
}

/// Creates a group and registers it process-wide. Creating a group under an
/// existing name replaces the previous one.
pub fn new_group(name: &str, max_bytes: usize, loader: Arc<dyn Loader>) -> Arc<Group> {
    let group = Arc::new(Group {
        name: name.to_string(),
        main_cache: LocalCache::new(max_bytes),
        hot_cache: LocalCache::new(max_bytes),
        loader,
        peers: OnceLock::new(),
        flight: FlightGroup::new(),
        hot_rng: Mutex::new(SmallRng::from_entropy()),
    });
    GROUPS.insert(name.to_string(), group.clone());
    tracing::info!(name, max_bytes, "registered cache group");
    group
}

/// Looks a group up by name; never creates one.
pub fn get_group(name: &str) -> Option<Arc<Group>> {
    GROUPS.get(name).map(|entry| entry.value().clone())
}

/// Snapshot of all registered groups, for diagnostics.
pub fn list_groups() -> Vec<Arc<Group>> {
    GROUPS.iter().map(|entry| entry.value().clone()).collect()
}

/// A named cache namespace: the authoritative main cache, the hot cache for
/// peer-served keys, the loader, and the peer picker routing misses.
pub struct Group {
    name: String,
    main_cache: LocalCache,
    hot_cache: LocalCache,
    loader: Arc<dyn Loader>,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    flight: FlightGroup<ByteView>,
    hot_rng: Mutex<SmallRng>,
}

impl Group {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read-through lookup.
    ///
    /// A hit in the main cache returns immediately. A miss enters
    /// singleflight and either fetches from the remote owner or runs the
    /// local loader; only locally loaded values populate the main cache.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            bail!("key is empty at group.Get()");
        }

        if let Some(view) = self.main_cache.get(key) {
            tracing::debug!(group = %self.name, key, "cache hit");
            return Ok(view);
        }

        tracing::debug!(group = %self.name, key, "cache miss");
        self.load(key).await
    }

    /// Runs the miss path under singleflight: concurrent misses on one key
    /// resolve to a single load.
    async fn load(&self, key: &str) -> Result<ByteView> {
        self.flight.run(key, self.load_once(key)).await
    }

    async fn load_once(&self, key: &str) -> Result<ByteView> {
        if let Some(picker) = self.peers.get() {
            if let Some(fetcher) = picker.pick_peer(key) {
                tracing::debug!(group = %self.name, key, "fetching from remote owner");
                return self.fetch_from_peer(fetcher.as_ref(), key).await;
            }
        }
        self.load_locally(key).await
    }

    /// Fetches a key this node does not own. The result is sampled into the
    /// hot cache so a surge on a remote-owned key is absorbed locally, but it
    /// never enters the main cache: that would blur ownership.
    async fn fetch_from_peer(&self, fetcher: &dyn PeerFetcher, key: &str) -> Result<ByteView> {
        let bytes = fetcher.fetch(&self.name, key).await.map_err(|err| {
            tracing::warn!(group = %self.name, key, error = %format!("{err:#}"), "peer fetch failed");
            err
        })?;

        let view = ByteView::from(bytes);
        if self.sample_hot() {
            if let Err(err) = self.hot_cache.add(key, view.clone()) {
                tracing::warn!(group = %self.name, key, error = %err, "hot cache admission failed");
            }
        }
        Ok(view)
    }

    /// Loads through the application loader and admits the result into the
    /// main cache. Admission failure surfaces to the caller.
    async fn load_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = self.loader.load(key).await?;
        let view = ByteView::from(bytes);
        self.main_cache.add(key, view.clone())?;
        Ok(view)
    }

    fn sample_hot(&self) -> bool {
        self.hot_rng.lock().gen_range(0..HOT_SAMPLE_ONE_IN) == 0
    }

    /// Installs the peer picker and makes sure the local node is on its
    /// ring. One-shot: a group's picker can never be swapped.
    ///
    /// # Panics
    /// Panics when called twice on the same group.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) -> Result<()> {
        if self.peers.set(picker.clone()).is_err() {
            panic!("peers registered more than once for group {}", self.name);
        }
        picker.add_peers(&[])
    }

    /// Registers additional peer endpoints with the installed picker.
    pub fn add_peers(&self, peers: &[String]) -> Result<()> {
        match self.peers.get() {
            Some(picker) => picker.add_peers(peers),
            None => bail!("no peer picker registered for group {}", self.name),
        }
    }

    pub fn main_cache_len(&self) -> usize {
        self.main_cache.len()
    }

    pub fn main_cache_bytes(&self) -> usize {
        self.main_cache.used_bytes()
    }

    pub fn hot_cache_len(&self) -> usize {
        self.hot_cache.len()
    }

    pub fn hot_cache_bytes(&self) -> usize {
        self.hot_cache.used_bytes()
    }

    #[cfg(test)]
    pub(crate) fn seed_hot_sampler(&self, seed: u64) {
        *self.hot_rng.lock() = SmallRng::seed_from_u64(seed);
    }
}
