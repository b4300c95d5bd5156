//! Search example demonstrating live node discovery and round-robin balancing.
//!
//! Connects to ZooKeeper, prints the discovered live nodes, then runs the same
//! query several times so the requests spread across the cluster.
//!
//! # Environment Variables
//!
//! - `ZK_HOSTS`: Comma-separated ZooKeeper endpoints (default: localhost:9983)
//! - `COLLECTION`: Collection to search (default: gettingstarted)
//! - `QUERY`: Query string (default: *:*)
//! - `FACET_FIELDS`: Comma-separated facet fields (default: none)
//! - `REQUEST_COUNT`: Number of queries to run (default: 5)

use std::env;

use solr_lb::{SolrClient, SolrParams};
use tracing::{Level, error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    let zk_hosts = env::var("ZK_HOSTS").unwrap_or_else(|_| "localhost:9983".to_string());
    let collection = env::var("COLLECTION").unwrap_or_else(|_| "gettingstarted".to_string());
    let query = env::var("QUERY").unwrap_or_else(|_| "*:*".to_string());
    let facet_fields: Vec<String> = env::var("FACET_FIELDS")
        .map(|f| f.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    let request_count: u32 = env::var("REQUEST_COUNT")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or(5);

    info!("Connecting to ZooKeeper at {zk_hosts}");
    let client = SolrClient::connect(&zk_hosts).await?;

    let live = client.live_nodes().await?;
    info!("Live nodes: {:?}", live.nodes);

    let mut params = SolrParams::query(query);
    if !facet_fields.is_empty() {
        params = params.facet_fields(facet_fields);
    }

    for i in 1..=request_count {
        match client.query(&collection, "select", &params, None).await {
            Ok(resp) => {
                info!(
                    "Request {i}: {} matches in {}ms",
                    resp.response.num_found, resp.response_header.qtime
                );

                for (field, counts) in &resp.facet_counts.facet_fields {
                    for count in counts {
                        info!("  {field}: {} = {}", count.name, count.value);
                    }
                }
            }

            Err(e) => {
                error!("Request {i} failed: {e}");
            }
        }
    }

    Ok(())
}
