use crate::cli::{Args, Command};
use crate::config::EnvConfig;
use anyhow::Context;
use clap::Parser;
use rdf_sink_core::{SourceClient, SparqlStoreClient};
use rdf_sink_web::ServerConfig;
use reqwest::Url;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    match args.command {
        Command::Serve { bind } => serve(bind).await,
    }
}

async fn serve(bind: Option<String>) -> anyhow::Result<()> {
    let config = EnvConfig::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level)
                .with_context(|| format!("invalid LOG_LEVEL: {}", config.log_level))?,
        )
        .init();

    let source = SourceClient::new(config.source_api.as_str(), config.source_jwt.as_str())
        .context("could not build the source platform client")?;

    // The namespace table must be in place before the first request; without
    // it the service must not come up at all.
    let namespaces = source
        .namespaces()
        .await
        .context("loading namespaces from the source platform metadata")?;
    info!(count = namespaces.len(), "namespaces loaded");

    let endpoint = Url::parse(&config.sparql_endpoint)
        .with_context(|| format!("invalid SPARQL_ENDPOINT: {}", config.sparql_endpoint))?;
    let store =
        SparqlStoreClient::new(endpoint).context("could not build the triple store client")?;

    rdf_sink_web::serve(ServerConfig {
        bind: bind.unwrap_or_else(|| format!("0.0.0.0:{}", config.port)),
        graph_base: config.graph_base,
        namespaces,
        source,
        store: Arc::new(store),
    })
    .await
}
