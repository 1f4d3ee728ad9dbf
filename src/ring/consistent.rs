use std::collections::{BTreeMap, HashMap};

use anyhow::{bail, Result};
use rand::RngCore;

/// Hash function over raw bytes. CRC32-IEEE by default; tests substitute a
/// rigged function to force placements.
pub type Hasher = Box<dyn Fn(&[u8]) -> u32 + Send + Sync>;

const DEFAULT_SALT_LEN: usize = 1;
const DEFAULT_VIRTUAL_FACTOR: usize = 4;
/// How many fresh salts to try before giving up on a peer whose virtual
/// nodes keep landing on occupied ring positions.
const ADD_SALT_RETRIES: usize = 10;

/// Consistent-hash ring with salted virtual nodes.
///
/// The ring itself is not synchronized; the peer pool that owns it guards it
/// with its own lock.
pub struct HashRing {
    hasher: Hasher,
    virtual_factor: usize,
    salt_len: usize,
    /// One salt per live peer, needed to recompute its virtual nodes on
    /// removal.
    salts: HashMap<String, Vec<u8>>,
    /// Ordered virtual nodes: position hash to owning peer name.
    vnodes: BTreeMap<u32, String>,
}

impl HashRing {
    pub fn new() -> Self {
        Self::with_hasher(Box::new(crc32fast::hash))
    }

    pub fn with_hasher(hasher: Hasher) -> Self {
        Self {
            hasher,
            virtual_factor: DEFAULT_VIRTUAL_FACTOR,
            salt_len: DEFAULT_SALT_LEN,
            salts: HashMap::new(),
            vnodes: BTreeMap::new(),
        }
    }

    /// Hashes a peer name into its group of virtual-node positions under the
    /// given salt: `hash(name + decimal(i) + salt)` for each virtual index.
    fn group_hash(&self, name: &str, salt: &[u8]) -> Vec<u32> {
        (0..self.virtual_factor)
            .map(|v| {
                let suffixed = format!("{name}{v}");
                let mut buf = Vec::with_capacity(suffixed.len() + salt.len());
                buf.extend_from_slice(suffixed.as_bytes());
                buf.extend_from_slice(salt);
                (self.hasher)(&buf)
            })
            .collect()
    }

    /// Registers a peer, placing `virtual_factor` virtual nodes on the ring.
    ///
    /// Draws up to ten salts; a draw is discarded if any of the resulting
    /// positions is already occupied. Exhausting the retries is an error
    /// with a stable message relied on by callers.
    pub fn add_node(&mut self, name: &str) -> Result<()> {
        if self.salts.contains_key(name) {
            bail!("the node already exists");
        }

        for _ in 0..ADD_SALT_RETRIES {
            let mut salt = vec![0u8; self.salt_len];
            rand::thread_rng().fill_bytes(&mut salt);

            let hashes = self.group_hash(name, &salt);
            if hashes.iter().any(|hash| self.vnodes.contains_key(hash)) {
                continue;
            }

            for &hash in &hashes {
                if self.vnodes.insert(hash, name.to_string()).is_some() {
                    // Occupancy was checked above, so a displaced entry means
                    // the group itself produced duplicate positions and the
                    // ring is now inconsistent.
                    panic!("virtual node {hash} displaced an existing entry while adding {name}");
                }
            }
            self.salts.insert(name.to_string(), salt);
            return Ok(());
        }

        bail!("too many vNode number collisions after retries")
    }

    /// Unregisters a peer, deleting all of its virtual nodes.
    pub fn remove_node(&mut self, name: &str) -> Result<()> {
        let Some(salt) = self.salts.remove(name) else {
            bail!("node name doesn't exist");
        };

        for hash in self.group_hash(name, &salt) {
            if self.vnodes.remove(&hash).is_none() {
                panic!("ring corrupted: virtual node {hash} missing while removing {name}");
            }
        }
        Ok(())
    }

    /// Maps a key to its owning peer: the least virtual node at or after the
    /// key's hash, wrapping around to the ring minimum.
    ///
    /// # Panics
    /// Panics on an empty ring; callers register at least the local node
    /// before routing.
    pub fn find_node(&self, query: &str) -> &str {
        assert!(!self.vnodes.is_empty(), "find_node on an empty ring");

        let hash = (self.hasher)(query.as_bytes());
        self.vnodes
            .range(hash..)
            .next()
            .or_else(|| self.vnodes.iter().next())
            .map(|(_, name)| name.as_str())
            .expect("non-empty ring has a first node")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.salts.contains_key(name)
    }

    /// Number of registered peers.
    pub fn len(&self) -> usize {
        self.vnodes.len() / self.virtual_factor
    }

    pub fn is_empty(&self) -> bool {
        self.vnodes.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn virtual_len(&self) -> usize {
        self.vnodes.len()
    }

    #[cfg(test)]
    pub(crate) fn virtual_factor(&self) -> usize {
        self.virtual_factor
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}
