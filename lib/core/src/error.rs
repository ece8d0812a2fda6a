use crate::stream::SnapshotReport;

/// An error contacting the source dataset platform or decoding its answers.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Connection failure, timeout or error status from the platform.
    #[error("source platform request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The platform answered with a document missing the expected shape.
    #[error("unexpected source payload: {0}")]
    Payload(String),
}

/// An error dispatching one SPARQL Update to the triple store.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("update request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("update endpoint answered {0}")]
    UpstreamStatus(reqwest::StatusCode),
}

/// An error while incrementally decoding the exported entity array.
#[derive(Debug, thiserror::Error)]
pub enum StreamDecodeError {
    #[error("expected `{expected}` at byte {offset} of the entity stream")]
    Delimiter { expected: char, offset: usize },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("entity stream ended unexpectedly")]
    UnexpectedEof,
}

/// A snapshot export that failed mid-stream.
///
/// Both variants carry the partial report: batches dispatched before the
/// failure stand and the caller reports them alongside the failure instead
/// of pretending the run succeeded.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("entity stream decode failed: {0}")]
    Decode(StreamDecodeError, SnapshotReport),
    #[error("entity stream transport failed: {0}")]
    Transport(reqwest::Error, SnapshotReport),
}

impl ExportError {
    /// Splits into the failure message and the partial report of batches
    /// dispatched before the abort.
    pub fn into_parts(self) -> (String, SnapshotReport) {
        match self {
            Self::Decode(error, report) => (error.to_string(), report),
            Self::Transport(error, report) => (error.to_string(), report),
        }
    }
}
