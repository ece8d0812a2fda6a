use rdf_sink_core::{SourceClient, UpdateDispatcher};
use rdf_sink_model::Namespaces;
use std::sync::Arc;

/// Holds the configuration for one sink server instance.
///
/// Everything here is assembled once at startup; in particular the namespace
/// table is complete before the listener binds and is never written again.
pub struct ServerConfig {
    /// The IP address and port the socket binds to.
    pub bind: String,
    /// Base IRI that graph names are appended to.
    pub graph_base: String,
    /// The namespace table loaded from the source platform metadata.
    pub namespaces: Namespaces,
    /// Client for the source dataset platform.
    pub source: SourceClient,
    /// Dispatcher for the triple store's update endpoint.
    pub store: Arc<dyn UpdateDispatcher>,
}
