//! Client configuration.

use std::time::Duration;

/// Configuration for a [`SolrClient`](crate::SolrClient).
///
/// The defaults match a stock SolrCloud deployment: live nodes are registered
/// under `/live_nodes` and reached over plain HTTP.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// How long a discovered live-node list stays fresh.
    pub refresh_interval: Duration,

    /// ZooKeeper path whose children are the live nodes.
    pub live_nodes_path: String,

    /// URL scheme used to reach nodes.
    pub scheme: String,

    /// Upper bound on a single live-node listing.
    pub discovery_timeout: Duration,

    /// Default timeout for queries.
    pub query_timeout: Duration,

    /// Timeout for commits.
    pub commit_timeout: Duration,

    /// Timeout for indexing and delete-by-query.
    pub update_timeout: Duration,

    /// Default timeout for collection create and delete.
    pub admin_timeout: Duration,

    /// Timeout for schema requests.
    pub schema_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(5),
            live_nodes_path: "/live_nodes".to_string(),
            scheme: "http".to_string(),
            discovery_timeout: Duration::from_secs(5),
            query_timeout: Duration::from_secs(10),
            commit_timeout: Duration::from_secs(30),
            update_timeout: Duration::from_secs(10),
            admin_timeout: Duration::from_secs(10),
            schema_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how long a live-node list stays fresh.
    #[must_use]
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Sets the ZooKeeper path listing live nodes.
    #[must_use]
    pub fn live_nodes_path(mut self, path: impl Into<String>) -> Self {
        self.live_nodes_path = path.into();
        self
    }

    /// Sets the URL scheme, e.g. `https`.
    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Sets the bound on a single live-node listing.
    #[must_use]
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    /// Sets the default query timeout.
    #[must_use]
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Sets the commit timeout.
    #[must_use]
    pub fn commit_timeout(mut self, timeout: Duration) -> Self {
        self.commit_timeout = timeout;
        self
    }

    /// Sets the indexing and delete-by-query timeout.
    #[must_use]
    pub fn update_timeout(mut self, timeout: Duration) -> Self {
        self.update_timeout = timeout;
        self
    }

    /// Sets the default collection admin timeout.
    #[must_use]
    pub fn admin_timeout(mut self, timeout: Duration) -> Self {
        self.admin_timeout = timeout;
        self
    }

    /// Sets the schema request timeout.
    #[must_use]
    pub fn schema_timeout(mut self, timeout: Duration) -> Self {
        self.schema_timeout = timeout;
        self
    }
}
