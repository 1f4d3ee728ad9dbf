use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::group::PeerFetcher;

/// HTTP fetcher bound to a single peer.
///
/// The `reqwest` client is shared with the pool that created this fetcher,
/// so every peer request carries the pool's deadline.
pub struct PeerClient {
    /// Peer base URL, e.g. `http://10.0.0.7:7000/_peercache/`.
    base_url: String,
    http_client: reqwest::Client,
}

impl PeerClient {
    pub fn new(base_url: &str, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PeerFetcher for PeerClient {
    async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = format!("{}{}/{}", self.base_url, group, key);

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            bail!(
                "peer {} returned {}: {}",
                self.base_url,
                status,
                String::from_utf8_lossy(&body).trim_end()
            );
        }
        Ok(body.to_vec())
    }
}
