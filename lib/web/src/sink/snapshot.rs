use crate::error::SinkServerError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use rdf_sink_core::{run_snapshot, snapshot_graph_iri, SnapshotReport};
use rdf_sink_model::NamedNode;
use serde::Serialize;
use tracing::{error, info};

#[derive(Serialize)]
pub struct SnapshotResponse {
    skipped_stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    graph: Option<String>,
    entities: u64,
    batches: u32,
    failed_batches: u32,
    skipped_entities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SnapshotResponse {
    fn stale() -> Self {
        Self {
            skipped_stale: true,
            graph: None,
            entities: 0,
            batches: 0,
            failed_batches: 0,
            skipped_entities: Vec::new(),
            error: None,
        }
    }

    fn from_report(graph: &NamedNode, report: SnapshotReport, error: Option<String>) -> Self {
        Self {
            skipped_stale: false,
            graph: Some(graph.as_str().to_owned()),
            entities: report.entities,
            batches: report.batches,
            failed_batches: report.failed_batches,
            skipped_entities: report.skipped,
            error,
        }
    }
}

/// The batched full-export path: freshness gate, then one additive insert
/// statement per batch of the streamed export, into a date-suffixed graph.
pub async fn handle_snapshot(
    State(state): State<AppState>,
    Path((graph, dataset)): Path<(String, String)>,
) -> Result<Response, SinkServerError> {
    if !state.source.modified_today(&dataset).await? {
        info!(dataset, "dataset not modified today, skipping snapshot");
        return Ok(Json(SnapshotResponse::stale()).into_response());
    }

    let graph_iri = snapshot_graph_iri(&state.graph_base, &graph, Local::now().date_naive())
        .map_err(|e| SinkServerError::BadRequest(format!("invalid graph name: {e}")))?;
    let stream = state.source.export_entities(&dataset).await?;

    match run_snapshot(stream, &graph_iri, &state.namespaces, state.store.as_ref()).await {
        Ok(report) => Ok(Json(SnapshotResponse::from_report(&graph_iri, report, None)).into_response()),
        // The export aborted mid-stream. Batches already dispatched stand;
        // the caller gets the partial tally, not a silent success.
        Err(export_error) => {
            error!(%export_error, "snapshot export aborted");
            let (message, report) = export_error.into_parts();
            Ok((
                StatusCode::BAD_GATEWAY,
                Json(SnapshotResponse::from_report(&graph_iri, report, Some(message))),
            )
                .into_response())
        }
    }
}
