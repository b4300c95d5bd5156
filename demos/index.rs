//! Indexing example against a single Solr node, without ZooKeeper.
//!
//! Creates a collection (tolerating one that already exists), indexes two
//! documents, commits, reads them back and deletes one by query.
//!
//! # Environment Variables
//!
//! - `SOLR_URL`: Base address of the node (default: http://localhost:8983/solr)
//! - `COLLECTION`: Collection to use (default: test)

use std::env;
use std::time::Duration;

use solr_lb::{Error, SolrClient, SolrDocument, SolrDocumentCollection, SolrParams};
use tracing::{Level, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    let solr_url = env::var("SOLR_URL").unwrap_or_else(|_| "http://localhost:8983/solr".to_string());
    let collection = env::var("COLLECTION").unwrap_or_else(|_| "test".to_string());

    let client = SolrClient::direct(&solr_url)?;

    match client
        .create_collection(&collection, 1, 1, Some(Duration::from_secs(180)))
        .await
    {
        Ok(_) => info!("Created collection {collection}"),
        Err(Error::CollectionExists(name)) => warn!("Collection {name} already exists"),
        Err(e) => return Err(e.into()),
    }

    let mut docs = SolrDocumentCollection::new();
    docs.add_doc(
        SolrDocument::new("1")?
            .with_field("test_txt", ["test1", "test2", "test3"])
            .with_field("test_s", ["test1"]),
    )?;
    docs.add_doc(
        SolrDocument::new("2")?
            .with_field("test_txt", ["test3", "test4", "test5"])
            .with_field("test_s", ["test2"]),
    )?;

    client.post_docs(&collection, &docs).await?;
    client.commit(&collection).await?;
    info!("Indexed {} documents", docs.num_docs());

    let params = SolrParams::query("*:*").facet_fields(["test_s"]);
    let resp = client.query(&collection, "select", &params, None).await?;
    for doc in &resp.response.docs {
        info!("{}: {:?}", doc.string("id")?, doc.string_slice("test_s")?);
    }

    client.delete_by_query(&collection, r#"test_s:"test1""#).await?;
    client.commit(&collection).await?;

    let resp = client.query(&collection, "select", &SolrParams::query("*:*"), None).await?;
    info!("{} documents left after delete", resp.response.num_found);

    Ok(())
}
