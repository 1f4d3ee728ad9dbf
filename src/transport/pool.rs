use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::Mutex;

use crate::group::{PeerFetcher, PeerPicker};
use crate::ring::HashRing;

use super::client::PeerClient;
use super::protocol::{PurgeRequest, BASE_PATH};

/// Deadline for a single peer fetch. A peer that cannot answer within this
/// window is treated as failed for that request.
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_millis(200);

struct PoolState {
    ring: HashRing,
    fetchers: HashMap<String, Arc<PeerClient>>,
}

/// The fleet as seen from one node: a consistent-hash ring of peer base URLs
/// plus an HTTP client per peer.
///
/// The pool registers its own URL on the ring, which is how `pick_peer`
/// recognises keys the local node owns.
pub struct HttpPool {
    self_url: String,
    inner: Mutex<PoolState>,
    http_client: reqwest::Client,
}

impl HttpPool {
    /// Creates a pool advertising `http://<advertise_addr>/_peercache/` with
    /// the default peer deadline.
    pub fn new(advertise_addr: &str) -> Arc<Self> {
        Self::with_timeout(advertise_addr, DEFAULT_PEER_TIMEOUT)
    }

    pub fn with_timeout(advertise_addr: &str, timeout: Duration) -> Arc<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build peer HTTP client");

        Arc::new(Self {
            self_url: format!("http://{advertise_addr}{BASE_PATH}"),
            inner: Mutex::new(PoolState {
                ring: HashRing::new(),
                fetchers: HashMap::new(),
            }),
            http_client,
        })
    }

    pub fn self_url(&self) -> &str {
        &self.self_url
    }

    /// Registers peer base URLs, always including the pool's own URL.
    /// Idempotent: already-known peers are skipped.
    pub fn add_peers(&self, peers: &[String]) -> Result<()> {
        let mut inner = self.inner.lock();

        let mut all = peers.to_vec();
        all.push(self.self_url.clone());

        for peer in all {
            if inner.ring.contains(&peer) {
                continue;
            }
            inner
                .ring
                .add_node(&peer)
                .with_context(|| format!("can't add the peer {peer}"))?;
            inner.fetchers.insert(
                peer.clone(),
                Arc::new(PeerClient::new(&peer, self.http_client.clone())),
            );
            tracing::info!(%peer, "registered cache peer");
        }
        Ok(())
    }

    /// Unregisters peer base URLs. Not idempotent: removing an unknown peer
    /// is an error.
    pub fn remove_peers(&self, peers: &[String]) -> Result<()> {
        let mut inner = self.inner.lock();

        for peer in peers {
            inner
                .ring
                .remove_node(peer)
                .with_context(|| format!("can't remove the peer {peer}"))?;
            inner.fetchers.remove(peer);
            tracing::info!(%peer, "removed cache peer");
        }
        Ok(())
    }

    /// Registered peers, the local node included.
    pub fn peer_count(&self) -> usize {
        self.inner.lock().ring.len()
    }

    /// Asks a remote node to drop peers from its own pool.
    pub async fn purge_remote(&self, remote_base: &str, peers: &[String]) -> Result<()> {
        let url = format!("{remote_base}purge");
        let response = self
            .http_client
            .post(&url)
            .json(&PurgeRequest {
                peers: peers.to_vec(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("purge on {remote_base} failed {status}: {body}");
        }
        Ok(())
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>> {
        let inner = self.inner.lock();

        let owner = inner.ring.find_node(key);
        if owner == self.self_url {
            return None;
        }

        tracing::debug!(key, peer = owner, "key owned by remote peer");
        inner
            .fetchers
            .get(owner)
            .map(|fetcher| fetcher.clone() as Arc<dyn PeerFetcher>)
    }

    fn add_peers(&self, peers: &[String]) -> Result<()> {
        HttpPool::add_peers(self, peers)
    }
}
