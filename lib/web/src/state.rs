use crate::config::ServerConfig;
use rdf_sink_core::{SourceClient, UpdateDispatcher};
use rdf_sink_model::Namespaces;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub namespaces: Arc<Namespaces>,
    pub source: SourceClient,
    pub store: Arc<dyn UpdateDispatcher>,
    pub graph_base: Arc<str>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            namespaces: Arc::new(config.namespaces),
            source: config.source,
            store: config.store,
            graph_base: config.graph_base.into(),
        }
    }
}
