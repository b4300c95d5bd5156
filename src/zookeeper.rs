//! ZooKeeper-backed [`Coordinator`].

use async_trait::async_trait;
use tracing::debug;

use crate::discovery::Coordinator;
use crate::error::{Error, Result};

/// Lists live nodes from a ZooKeeper ensemble.
///
/// The session is opened once by [`connect`](Self::connect) and reused.
/// Session loss is not recovered; build a new client in that case.
pub struct ZooKeeperCoordinator {
    client: zookeeper_client::Client,
}

impl ZooKeeperCoordinator {
    /// Connects to the ensemble given as comma-separated `host:port` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if no session can be established.
    pub async fn connect(endpoints: &str) -> Result<Self> {
        let cluster = connect_string(endpoints);
        if cluster.is_empty() {
            return Err(Error::Connection("no ZooKeeper endpoints given".to_string()));
        }

        debug!("connecting to ZooKeeper at {cluster}");

        let client = zookeeper_client::Client::connect(&cluster)
            .await
            .map_err(|e| Error::Connection(format!("failed to connect to {cluster}: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Coordinator for ZooKeeperCoordinator {
    async fn list_children(&self, path: &str) -> Result<Vec<String>> {
        self.client
            .list_children(path)
            .await
            .map_err(|e| Error::Connection(format!("failed to list {path}: {e}")))
    }
}

/// Normalises a comma-separated endpoint list, dropping blanks.
fn connect_string(endpoints: &str) -> String {
    endpoints
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_string_trims_entries() {
        assert_eq!(
            connect_string(" zk1:2181, zk2:2181 ,,zk3:2181"),
            "zk1:2181,zk2:2181,zk3:2181"
        );
    }

    #[test]
    fn connect_string_empty() {
        assert_eq!(connect_string(" , "), "");
    }

    #[tokio::test]
    async fn connect_rejects_empty_endpoints() {
        let err = ZooKeeperCoordinator::connect("").await.err().unwrap();
        assert!(matches!(err, Error::Connection(_)));
    }
}
