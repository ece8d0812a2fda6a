use crate::error::DispatchError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tracing::debug;

const UPDATE_TIMEOUT: Duration = Duration::from_secs(10);
const SPARQL_UPDATE_MIME: &str = "application/sparql-update";

/// The narrow seam to the triple store. The batch paths only ever hand a
/// finished update statement to this trait, which keeps them exercisable
/// without a network.
#[async_trait]
pub trait UpdateDispatcher: Send + Sync {
    async fn dispatch(&self, update: &str) -> Result<(), DispatchError>;
}

/// Client for the SPARQL Update endpoint of the triple store.
#[derive(Debug, Clone)]
pub struct SparqlStoreClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl SparqlStoreClient {
    pub fn new(endpoint: Url) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(UPDATE_TIMEOUT).build()?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl UpdateDispatcher for SparqlStoreClient {
    /// Posts one SPARQL Update. Only HTTP 200 counts as success; there is no
    /// retry, callers decide whether to continue.
    async fn dispatch(&self, update: &str) -> Result<(), DispatchError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, SPARQL_UPDATE_MIME)
            .body(update.to_owned())
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(DispatchError::UpstreamStatus(response.status()));
        }
        debug!("update accepted");
        Ok(())
    }
}
