use anyhow::Context;
use std::env;

/// Environment configuration, read once at process start and never re-read.
pub struct EnvConfig {
    /// Base URL of the source dataset platform API.
    pub source_api: String,
    /// Bearer token for the platform API.
    pub source_jwt: String,
    /// URL of the triple store's SPARQL Update endpoint.
    pub sparql_endpoint: String,
    /// Base IRI that graph names are appended to.
    pub graph_base: String,
    /// Port the service listens on.
    pub port: u16,
    /// tracing filter directive, e.g. `info` or `rdf_sink_core=debug`.
    pub log_level: String,
}

impl EnvConfig {
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self {
            source_api: require("SOURCE_API")?,
            source_jwt: env::var("SOURCE_JWT").unwrap_or_default(),
            sparql_endpoint: require("SPARQL_ENDPOINT")?,
            graph_base: require("GRAPH_BASE")?,
            port: match env::var("SERVICE_PORT") {
                Ok(port) => port
                    .parse()
                    .with_context(|| format!("SERVICE_PORT is not a port number: {port}"))?,
                Err(_) => 5000,
            },
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned()),
        })
    }
}

fn require(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{name} must be set"))
}
