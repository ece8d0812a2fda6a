use crate::error::SourceError;
use bytes::Bytes;
use chrono::{Local, NaiveDate};
use futures::Stream;
use rdf_sink_model::Namespaces;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

/// Timeout for metadata and dataset status lookups.
const API_TIMEOUT: Duration = Duration::from_secs(10);
/// The entity export of a large dataset can run long.
const EXPORT_TIMEOUT: Duration = Duration::from_secs(360);

const NAMESPACES_POINTER: &str = "/config/effective/namespaces/default";
const LAST_MODIFIED_POINTER: &str = "/runtime/last-modified";

/// Bearer-token authenticated client for the source dataset platform.
#[derive(Debug, Clone)]
pub struct SourceClient {
    http: reqwest::Client,
    base: String,
    token: String,
}

impl SourceClient {
    pub fn new(base: impl Into<String>, token: impl Into<String>) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(API_TIMEOUT).build()?;
        Ok(Self {
            http,
            base: base.into().trim_end_matches('/').to_owned(),
            token: token.into(),
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{path}", self.base))
            .bearer_auth(&self.token)
    }

    /// Loads the namespace table from the platform metadata document.
    ///
    /// The service must not start serving without this table, so a failure
    /// here is fatal to startup; there is no retry.
    pub async fn namespaces(&self) -> Result<Namespaces, SourceError> {
        let document: JsonValue = self
            .get("/metadata")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let Some(mappings) = document
            .pointer(NAMESPACES_POINTER)
            .and_then(JsonValue::as_object)
        else {
            return Err(SourceError::Payload(
                "metadata is missing config.effective.namespaces.default".to_owned(),
            ));
        };

        let mut table = HashMap::with_capacity(mappings.len());
        for (prefix, namespace) in mappings {
            match namespace.as_str() {
                Some(namespace) => {
                    table.insert(prefix.clone(), namespace.to_owned());
                }
                None => warn!(prefix, "ignoring non-string namespace mapping"),
            }
        }
        Ok(Namespaces::new(table))
    }

    /// Whether the dataset's last modification falls on the current day.
    ///
    /// A missing or mistyped `runtime.last-modified` is an explicit error;
    /// the freshness gate never silently defaults open or closed.
    pub async fn modified_today(&self, dataset: &str) -> Result<bool, SourceError> {
        let document: JsonValue = self
            .get(&format!("/datasets/{dataset}"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let last_modified = document
            .pointer(LAST_MODIFIED_POINTER)
            .and_then(JsonValue::as_str)
            .ok_or_else(|| {
                SourceError::Payload("dataset status is missing runtime.last-modified".to_owned())
            })?;
        Ok(modified_on(last_modified, Local::now().date_naive()))
    }

    /// Opens the dataset's entity export as a byte stream.
    pub async fn export_entities(
        &self,
        dataset: &str,
    ) -> Result<impl Stream<Item = Result<Bytes, reqwest::Error>>, SourceError> {
        let response = self
            .get(&format!("/datasets/{dataset}/entities"))
            .timeout(EXPORT_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes_stream())
    }
}

/// Day-granularity prefix comparison. Coarse: a timestamp is only compared
/// by its first ten characters against the given date.
fn modified_on(last_modified: &str, date: NaiveDate) -> bool {
    last_modified.get(..10) == Some(date.format("%Y-%m-%d").to_string().as_str())
}
