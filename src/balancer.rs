//! Round-robin selection over the live node list.

use tracing::trace;

use crate::discovery::{CacheState, LiveNodeCache};
use crate::error::{Error, Result};

/// Round-robin cursor over a node list.
///
/// The cursor always indexes into the list it was last used with; the cache
/// resets it whenever it replaces the list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundRobin {
    cursor: usize,
}

impl RoundRobin {
    /// Creates a cursor positioned at the first node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the cursor back to the first node.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Index the next selection will use.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Returns the node under the cursor and advances it, wrapping after the
    /// last node. A single-node list always yields that node.
    pub fn select<'a>(&mut self, nodes: &'a [String]) -> Option<&'a str> {
        match nodes {
            [] => None,
            [only] => Some(only.as_str()),
            _ => {
                let index = self.cursor % nodes.len();
                self.cursor = (index + 1) % nodes.len();
                Some(nodes[index].as_str())
            }
        }
    }
}

/// Picks node addresses in turn from a [`LiveNodeCache`].
pub struct LoadBalancer {
    cache: LiveNodeCache,
}

impl LoadBalancer {
    /// Creates a balancer over the given cache.
    #[must_use]
    pub fn new(cache: LiveNodeCache) -> Self {
        Self { cache }
    }

    /// The underlying live node cache.
    #[must_use]
    pub fn cache(&self) -> &LiveNodeCache {
        &self.cache
    }

    /// Returns the next node address.
    ///
    /// Populates the cache on first use and refreshes it when stale. Refresh
    /// and selection happen under the cache lock, so the cursor never points
    /// into a list it was not advanced over.
    ///
    /// # Errors
    ///
    /// Returns the discovery error if the cache has never been populated and
    /// the first discovery fails.
    pub async fn next_address(&self) -> Result<String> {
        let mut state = self.cache.lock_current().await?;
        let CacheState { nodes, cursor, .. } = &mut *state;

        let address = cursor
            .select(nodes)
            .map(str::to_string)
            .ok_or_else(|| Error::NoLiveNodes(self.cache.path().to_string()))?;

        trace!("selected node {address}");
        Ok(address)
    }
}
