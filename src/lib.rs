#![deny(missing_docs)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! SolrCloud client with [ZooKeeper](https://zookeeper.apache.org) live node discovery and
//! round-robin load balancing.
//!
//! A SolrCloud cluster registers each running node under `/live_nodes` in ZooKeeper. This crate
//! lists those nodes, caches them for a few seconds, and spreads requests across them in
//! round-robin order. It also encodes Solr's request formats and decodes its responses, including
//! facet counts and untyped result documents.
//!
//! # Features
//!
//! - **Live node discovery**: Cached `/live_nodes` listing, refreshed every 5 seconds by default
//! - **Round-robin balancing**: Requests cycle through the live nodes in list order
//! - **Direct mode**: Talk to a single node without ZooKeeper
//! - **Typed responses**: Checked accessors for result fields, ordered facet counts
//! - **Multi-valued documents**: Build and index documents in the shape Solr expects
//!
//! Enable the `zookeeper` cargo feature for [`SolrClient::connect`].
//!
//! # Usage
//!
//! ```ignore
//! use std::time::Duration;
//! use solr_lb::{SolrClient, SolrDocument, SolrDocumentCollection, SolrParams};
//!
//! let client = SolrClient::connect("zk1:2181,zk2:2181,zk3:2181").await?;
//!
//! let mut docs = SolrDocumentCollection::new();
//! docs.add_doc(SolrDocument::new("1")?.with_field("title_s", ["Rust"]))?;
//! client.post_docs("books", &docs).await?;
//! client.commit("books").await?;
//!
//! let params = SolrParams::query("*:*").facet_fields(["title_s"]);
//! let resp = client.query("books", "select", &params, None).await?;
//! for doc in &resp.response.docs {
//!     println!("{}", doc.string("id")?);
//! }
//! ```

mod balancer;
mod client;
mod config;
mod discovery;
mod document;
mod error;
mod params;
mod response;
mod schema;
mod transport;

#[cfg(feature = "zookeeper")]
mod zookeeper;

#[cfg(test)]
mod test_support;

pub use balancer::{LoadBalancer, RoundRobin};
pub use client::SolrClient;
pub use config::ClientConfig;
pub use discovery::{Coordinator, LiveNodeCache, LiveNodes, node_address};
pub use document::{ID_FIELD, SolrDocument, SolrDocumentCollection};
pub use error::{Error, Result};
pub use params::{FacetField, JSON_NL_ARRNTV, SolrParams};
pub use response::{
    ApiError, ApiException, CollectionsApiResponse, FacetCount, FacetCounts, FieldValue,
    ResponseHeader, ResultSet, SearchDocument, SearchResponse,
};
pub use schema::{Analyzer, Component, FieldType, FieldTypesResponse};
pub use transport::{
    Body, FORM_CONTENT_TYPE, HttpRequest, HttpResponse, JSON_CONTENT_TYPE, ReqwestTransport,
    Transport,
};

#[cfg(feature = "zookeeper")]
pub use zookeeper::ZooKeeperCoordinator;
