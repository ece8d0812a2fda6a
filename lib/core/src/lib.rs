mod error;
mod source;
mod store;
mod stream;
mod update;

pub use error::{DispatchError, ExportError, SourceError, StreamDecodeError};
pub use source::SourceClient;
pub use store::{SparqlStoreClient, UpdateDispatcher};
pub use stream::{entity_label, run_snapshot, SnapshotReport, BATCH_SIZE};
pub use update::{build_insert_data, build_replace, graph_iri, snapshot_graph_iri, BuiltUpdate};
