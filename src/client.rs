//! The Solr client.
//!
//! Each operation takes the next node from the [`LoadBalancer`], builds the
//! request for that node, sends it once through the [`Transport`] and
//! classifies the response. Nothing is retried; retry policy belongs to the
//! caller.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::balancer::LoadBalancer;
use crate::config::ClientConfig;
use crate::discovery::{Coordinator, LiveNodeCache, LiveNodes};
use crate::document::SolrDocumentCollection;
use crate::error::{Error, Result};
use crate::params::SolrParams;
use crate::response::{CollectionsApiResponse, SearchResponse};
use crate::schema::FieldTypesResponse;
use crate::transport::{
    FORM_CONTENT_TYPE, HttpRequest, HttpResponse, JSON_CONTENT_TYPE, ReqwestTransport, Transport,
};

/// Prefix of the collections API message for a duplicate collection.
const COLLECTION_EXISTS_PREFIX: &str = "collection already exists";

/// Client for a SolrCloud cluster or a single Solr node.
///
/// A client is meant to be shared (for example behind an [`Arc`]) by any
/// number of concurrent tasks.
pub struct SolrClient {
    balancer: LoadBalancer,
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl SolrClient {
    /// Connects to ZooKeeper and discovers live nodes from it.
    ///
    /// `zk_hosts` is a comma-separated list of `host:port` endpoints. The
    /// connection is made once and reused for the client's lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if ZooKeeper cannot be reached, or
    /// [`Error::Transport`] if the HTTP client cannot be created.
    #[cfg(feature = "zookeeper")]
    pub async fn connect(zk_hosts: &str) -> Result<Self> {
        Self::connect_with_config(zk_hosts, ClientConfig::default()).await
    }

    /// Like [`connect`](Self::connect), with explicit configuration.
    ///
    /// # Errors
    ///
    /// See [`connect`](Self::connect).
    #[cfg(feature = "zookeeper")]
    pub async fn connect_with_config(zk_hosts: &str, config: ClientConfig) -> Result<Self> {
        let coordinator = crate::zookeeper::ZooKeeperCoordinator::connect(zk_hosts).await?;
        Self::with_coordinator(Arc::new(coordinator), config)
    }

    /// Creates a client that discovers live nodes through `coordinator`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP client cannot be created.
    pub fn with_coordinator(coordinator: Arc<dyn Coordinator>, config: ClientConfig) -> Result<Self> {
        let cache = LiveNodeCache::new(coordinator, &config);
        Ok(Self::new(cache, Arc::new(ReqwestTransport::new()?), config))
    }

    /// Creates a client for a single node, bypassing discovery.
    ///
    /// `address` is the node's base address such as `localhost:8983/solr`. A
    /// leading `http://` or `https://` sets the scheme.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `address` names no host, or
    /// [`Error::Transport`] if the HTTP client cannot be created.
    pub fn direct(address: &str) -> Result<Self> {
        Self::direct_with_config(address, ClientConfig::default())
    }

    /// Like [`direct`](Self::direct), with explicit configuration.
    ///
    /// # Errors
    ///
    /// See [`direct`](Self::direct).
    pub fn direct_with_config(address: &str, config: ClientConfig) -> Result<Self> {
        let (cache, config) = direct_cache(address, config)?;
        Ok(Self::new(cache, Arc::new(ReqwestTransport::new()?), config))
    }

    /// Assembles a client from its parts.
    #[must_use]
    pub fn new(cache: LiveNodeCache, transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            balancer: LoadBalancer::new(cache),
            transport,
            config,
        }
    }

    /// Replaces the HTTP transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the current live nodes, refreshing them if stale.
    ///
    /// # Errors
    ///
    /// Returns the discovery error if a due refresh fails.
    pub async fn live_nodes(&self) -> Result<LiveNodes> {
        self.balancer.cache().get_nodes().await
    }

    /// Returns the next node address in round-robin order.
    ///
    /// # Errors
    ///
    /// Returns the discovery error if no node list could ever be obtained.
    pub async fn next_address(&self) -> Result<String> {
        self.balancer.next_address().await
    }

    /// Runs a search against `{collection}/{handler}`.
    ///
    /// `timeout` defaults to the configured query timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestFailed`] for a non-200 response,
    /// [`Error::Decode`] for a malformed body, and discovery or transport
    /// errors as they occur.
    pub async fn query(
        &self,
        collection: &str,
        handler: &str,
        params: &SolrParams,
        timeout: Option<Duration>,
    ) -> Result<SearchResponse> {
        let url = format!("{}/{collection}/{handler}", self.base_url().await?);
        let request = HttpRequest::post(
            url,
            FORM_CONTENT_TYPE,
            params.encode(),
            timeout.unwrap_or(self.config.query_timeout),
        );

        let response = self.send(request).await?;
        decode(&check_status(response)?)
    }

    /// Commits pending updates so they become visible to searches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestFailed`] for a non-200 response, and discovery
    /// or transport errors as they occur.
    pub async fn commit(&self, collection: &str) -> Result<()> {
        let url = format!("{}/{collection}/update?commit=true", self.base_url().await?);
        let response = self
            .send(HttpRequest::get(url, self.config.commit_timeout))
            .await?;

        check_status(response).map(drop)
    }

    /// Deletes every document matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestFailed`] for a non-200 response, and discovery
    /// or transport errors as they occur.
    pub async fn delete_by_query(&self, collection: &str, query: &str) -> Result<()> {
        let body = serde_json::json!({ "delete": { "query": query } }).to_string();
        self.post_update(collection, body).await
    }

    /// Indexes serializable values, each becoming one document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a value cannot be serialized,
    /// [`Error::RequestFailed`] for a non-200 response, and discovery or
    /// transport errors as they occur.
    pub async fn post_structs<T>(&self, collection: &str, docs: &[T]) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let body = serde_json::to_string(docs)?;
        self.post_update(collection, body).await
    }

    /// Indexes a document collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestFailed`] for a non-200 response, and discovery
    /// or transport errors as they occur.
    pub async fn post_docs(&self, collection: &str, docs: &SolrDocumentCollection) -> Result<()> {
        let body = docs.bulk_json()?;
        self.post_update(collection, body).await
    }

    /// Sends a pre-encoded JSON array of documents to the update handler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestFailed`] for a non-200 response, and discovery
    /// or transport errors as they occur.
    pub async fn post_raw(&self, collection: &str, json: impl Into<String>) -> Result<()> {
        self.post_update(collection, json.into()).await
    }

    /// Creates a collection.
    ///
    /// `timeout` defaults to the configured admin timeout; creating a
    /// collection across many nodes can take much longer than other calls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CollectionExists`] if the collection already exists,
    /// [`Error::RequestFailed`] for any other non-200 response, and discovery
    /// or transport errors as they occur.
    pub async fn create_collection(
        &self,
        name: &str,
        num_shards: u32,
        replication_factor: u32,
        timeout: Option<Duration>,
    ) -> Result<CollectionsApiResponse> {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("action", "CREATE")
            .append_pair("name", name)
            .append_pair("numShards", &num_shards.to_string())
            .append_pair("replicationFactor", &replication_factor.to_string())
            .finish();

        let url = format!("{}/admin/collections?{query}", self.base_url().await?);
        let response = self
            .send(HttpRequest::get(
                url,
                timeout.unwrap_or(self.config.admin_timeout),
            ))
            .await?;

        check_collections(name, response)
    }

    /// Deletes a collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestFailed`] for a non-200 response (including an
    /// unknown collection), and discovery or transport errors as they occur.
    pub async fn delete_collection(&self, name: &str) -> Result<CollectionsApiResponse> {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("action", "DELETE")
            .append_pair("name", name)
            .finish();

        let url = format!("{}/admin/collections?{query}", self.base_url().await?);
        let response = self
            .send(HttpRequest::get(url, self.config.admin_timeout))
            .await?;

        check_collections(name, response)
    }

    /// Lists the field types of a collection's schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestFailed`] for a non-200 response,
    /// [`Error::Decode`] for a malformed body, and discovery or transport
    /// errors as they occur.
    pub async fn field_types(&self, collection: &str) -> Result<FieldTypesResponse> {
        let url = format!("{}/{collection}/schema/fieldtypes", self.base_url().await?);
        let response = self
            .send(HttpRequest::get(url, self.config.schema_timeout))
            .await?;

        decode(&check_status(response)?)
    }

    async fn post_update(&self, collection: &str, body: String) -> Result<()> {
        let url = format!("{}/{collection}/update", self.base_url().await?);
        let response = self
            .send(HttpRequest::post(
                url,
                JSON_CONTENT_TYPE,
                body,
                self.config.update_timeout,
            ))
            .await?;

        check_status(response).map(drop)
    }

    async fn base_url(&self) -> Result<String> {
        let address = self.balancer.next_address().await?;
        Ok(format!("{}://{address}", self.config.scheme))
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending Solr request");

        let response = self.transport.send(request).await?;

        debug!(status = response.status, "received Solr response");
        Ok(response)
    }
}

/// Splits an optional scheme off a direct node address.
fn direct_cache(address: &str, config: ClientConfig) -> Result<(LiveNodeCache, ClientConfig)> {
    let (config, rest) = match address.trim().split_once("://") {
        Some((scheme, rest)) => (config.scheme(scheme), rest),
        None => (config, address.trim()),
    };

    let node = rest.trim_end_matches('/');
    if node.is_empty() || node.starts_with('/') {
        return Err(Error::Validation(format!("node address {address:?} has no host")));
    }

    Ok((LiveNodeCache::direct(node), config))
}

/// Returns the body of a 200 response, or [`Error::RequestFailed`].
fn check_status(response: HttpResponse) -> Result<String> {
    if response.status == 200 {
        Ok(response.body)
    } else {
        Err(Error::RequestFailed {
            status: response.status,
            body: response.body,
        })
    }
}

/// Classifies a collections API response.
fn check_collections(name: &str, response: HttpResponse) -> Result<CollectionsApiResponse> {
    match response.status {
        200 => decode(&response.body),
        400 => {
            let exists = serde_json::from_str::<CollectionsApiResponse>(&response.body)
                .ok()
                .and_then(|envelope| envelope.message().map(str::to_string))
                .is_some_and(|msg| msg.starts_with(COLLECTION_EXISTS_PREFIX));

            if exists {
                Err(Error::CollectionExists(name.to_string()))
            } else {
                Err(Error::RequestFailed {
                    status: response.status,
                    body: response.body,
                })
            }
        }
        status => Err(Error::RequestFailed {
            status,
            body: response.body,
        }),
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}
