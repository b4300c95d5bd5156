//! SolrCloud live node discovery.
//!
//! Every running Solr node registers an ephemeral child under `/live_nodes`
//! in ZooKeeper. This module lists those children and caches the resulting
//! node addresses for a short interval.
//!
//! # How It Works
//!
//! 1. Lists the children of the live nodes path through a [`Coordinator`]
//! 2. Rewrites each node name (`10.0.0.1:8983_solr`) into a base address
//!    (`10.0.0.1:8983/solr`)
//! 3. Replaces the cached list and resets the round-robin cursor
//! 4. Serves the cached list until the refresh interval has passed
//!
//! A failed listing is remembered for one refresh interval. Callers in that
//! window get the remembered error (or the last known list, through the load
//! balancer) without contacting the coordination service again.
//!
//! The list, its refresh time and the cursor sit behind one lock. Checking
//! staleness, refreshing and selecting are a single step for each caller, so
//! concurrent callers never refresh twice or see a half-replaced list.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use solr_lb::{ClientConfig, LiveNodeCache, ZooKeeperCoordinator};
//!
//! let zk = ZooKeeperCoordinator::connect("zk1:2181,zk2:2181").await?;
//! let cache = LiveNodeCache::new(Arc::new(zk), &ClientConfig::default());
//!
//! let live = cache.get_nodes().await?;
//! println!("{:?}", live.nodes);
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::balancer::RoundRobin;
use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Marker Solr embeds in live node names in place of the context path.
const NODE_NAME_MARKER: &str = "_solr";

/// Context path the marker stands for.
const NODE_CONTEXT_PATH: &str = "/solr";

/// Hierarchical namespace used to list live nodes.
#[async_trait]
pub trait Coordinator: Send + Sync {
    /// Returns the names of the children of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the coordination service cannot be
    /// reached or the path cannot be listed.
    async fn list_children(&self, path: &str) -> Result<Vec<String>>;
}

/// Converts a live node name into a node base address by replacing the first
/// `_solr` with `/solr`.
#[must_use]
pub fn node_address(name: &str) -> String {
    name.replacen(NODE_NAME_MARKER, NODE_CONTEXT_PATH, 1)
}

/// Snapshot of the live node list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveNodes {
    /// Base addresses of the live nodes, without a scheme.
    pub nodes: Vec<String>,

    /// When the list was last refreshed; `None` for a fixed node.
    pub last_update: Option<Instant>,
}

/// Mutable cache state, guarded as a unit.
#[derive(Debug, Default)]
pub(crate) struct CacheState {
    pub(crate) nodes: Vec<String>,
    pub(crate) last_update: Option<Instant>,
    pub(crate) cursor: RoundRobin,
    last_attempt: Option<Instant>,
    last_error: Option<Error>,
}

enum NodeSource {
    Discovered(Arc<dyn Coordinator>),
    Fixed,
}

/// Time-bounded cache of live node addresses.
pub struct LiveNodeCache {
    source: NodeSource,
    path: String,
    refresh_interval: Duration,
    discovery_timeout: Duration,
    state: Mutex<CacheState>,
}

impl LiveNodeCache {
    /// Creates a cache that discovers nodes through `coordinator`.
    ///
    /// Nothing is listed until the first call that needs nodes.
    #[must_use]
    pub fn new(coordinator: Arc<dyn Coordinator>, config: &ClientConfig) -> Self {
        Self {
            source: NodeSource::Discovered(coordinator),
            path: config.live_nodes_path.clone(),
            refresh_interval: config.refresh_interval,
            discovery_timeout: config.discovery_timeout,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Creates a cache holding a single fixed node address. It is never
    /// refreshed.
    #[must_use]
    pub fn direct(address: impl Into<String>) -> Self {
        let config = ClientConfig::default();

        Self {
            source: NodeSource::Fixed,
            path: config.live_nodes_path,
            refresh_interval: config.refresh_interval,
            discovery_timeout: config.discovery_timeout,
            state: Mutex::new(CacheState {
                nodes: vec![address.into()],
                ..CacheState::default()
            }),
        }
    }

    /// Path whose children are listed.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the live nodes, refreshing them first if the list is stale.
    ///
    /// # Errors
    ///
    /// Returns the discovery error if a due refresh fails, or the error of a
    /// refresh that failed within the last refresh interval. The cached list is
    /// left untouched in either case.
    pub async fn get_nodes(&self) -> Result<LiveNodes> {
        let mut state = self.state.lock().await;
        self.refresh_if_stale(&mut state).await?;

        Ok(LiveNodes {
            nodes: state.nodes.clone(),
            last_update: state.last_update,
        })
    }

    /// Locks the cache with a current list.
    ///
    /// A failed refresh falls back to the last known list when there is one.
    pub(crate) async fn lock_current(&self) -> Result<MutexGuard<'_, CacheState>> {
        let mut state = self.state.lock().await;

        if let Err(e) = self.refresh_if_stale(&mut state).await {
            if state.nodes.is_empty() {
                return Err(e);
            }

            warn!(
                error = %e,
                nodes = state.nodes.len(),
                "live node refresh failed, serving last known nodes"
            );
        }

        Ok(state)
    }

    fn is_stale(&self, state: &CacheState) -> bool {
        match self.source {
            NodeSource::Fixed => false,
            NodeSource::Discovered(_) => state
                .last_update
                .is_none_or(|at| at.elapsed() > self.refresh_interval),
        }
    }

    /// Error of a failed listing that is still within the refresh interval.
    fn recent_failure(&self, state: &CacheState) -> Option<Error> {
        let at = state.last_attempt?;
        let err = state.last_error.as_ref()?;
        (at.elapsed() <= self.refresh_interval).then(|| err.clone())
    }

    async fn refresh_if_stale(&self, state: &mut CacheState) -> Result<()> {
        if !self.is_stale(state) {
            return Ok(());
        }

        let NodeSource::Discovered(coordinator) = &self.source else {
            return Ok(());
        };

        if let Some(err) = self.recent_failure(state) {
            debug!("skipping live node refresh after recent failure: {err}");
            return Err(err);
        }

        let result = self.discover(coordinator.as_ref()).await;
        state.last_attempt = Some(Instant::now());

        let nodes = match result {
            Ok(nodes) => nodes,
            Err(e) => {
                state.last_error = Some(e.clone());
                return Err(e);
            }
        };

        if nodes.len() != state.nodes.len() {
            info!("live nodes changed: {} -> {}", state.nodes.len(), nodes.len());
        }

        debug!("refreshed live nodes from {}: {nodes:?}", self.path);

        state.nodes = nodes;
        state.cursor.reset();
        state.last_update = state.last_attempt;
        state.last_error = None;
        Ok(())
    }

    async fn discover(&self, coordinator: &dyn Coordinator) -> Result<Vec<String>> {
        let names = tokio::time::timeout(
            self.discovery_timeout,
            coordinator.list_children(&self.path),
        )
        .await
        .map_err(|_| Error::Timeout(format!("listing {}", self.path)))??;

        let nodes = extract_node_addresses(&names);
        if nodes.is_empty() {
            return Err(Error::NoLiveNodes(self.path.clone()));
        }

        Ok(nodes)
    }
}

/// Converts live node names into base addresses, keeping their order.
fn extract_node_addresses(names: &[String]) -> Vec<String> {
    names
        .iter()
        .filter(|name| !name.is_empty())
        .map(|name| node_address(name))
        .collect()
}
