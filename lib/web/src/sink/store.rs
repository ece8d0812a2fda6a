use crate::error::SinkServerError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rdf_sink_core::{build_replace, entity_label, graph_iri, BuiltUpdate};
use rdf_sink_model::Entity;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use tracing::{error, warn};

#[derive(Serialize)]
pub struct StoreResponse {
    entities: u64,
    skipped_entities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// The incremental upsert path: one atomic replace statement for the posted
/// batch, one dispatch.
pub async fn handle_store(
    State(state): State<AppState>,
    Path(graph): Path<String>,
    Json(objects): Json<Vec<Map<String, JsonValue>>>,
) -> Result<Response, SinkServerError> {
    let graph_iri = graph_iri(&state.graph_base, &graph)
        .map_err(|e| SinkServerError::BadRequest(format!("invalid graph name: {e}")))?;

    let mut entities = Vec::with_capacity(objects.len());
    let mut skipped = Vec::new();
    for (index, object) in objects.iter().enumerate() {
        match Entity::from_json(object) {
            Ok(entity) => entities.push(entity),
            Err(decode_error) => {
                let label = entity_label(object, index as u64 + 1);
                warn!(entity = %label, %decode_error, "skipping entity");
                skipped.push(label);
            }
        }
    }

    let BuiltUpdate { update, skipped: unmapped } =
        build_replace(&graph_iri, &entities, &state.namespaces);
    skipped.extend(unmapped);

    let mut response = StoreResponse {
        entities: objects.len() as u64,
        skipped_entities: skipped,
        error: None,
    };
    match state.store.dispatch(&update).await {
        Ok(()) => Ok(Json(response).into_response()),
        // The dispatch is this request's whole unit of work, so its failure
        // is the request's failure.
        Err(dispatch_error) => {
            error!(%dispatch_error, "update dispatch failed");
            response.error = Some(dispatch_error.to_string());
            Ok((StatusCode::BAD_GATEWAY, Json(response)).into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{router, AppState};
    use async_trait::async_trait;
    use axum_test::TestServer;
    use rdf_sink_core::{DispatchError, SourceClient, UpdateDispatcher};
    use rdf_sink_model::Namespaces;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingDispatcher {
        updates: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl UpdateDispatcher for RecordingDispatcher {
        async fn dispatch(&self, update: &str) -> Result<(), DispatchError> {
            self.updates.lock().unwrap().push(update.to_owned());
            if self.fail {
                // axum and reqwest share the same `http` StatusCode type.
                return Err(DispatchError::UpstreamStatus(
                    StatusCode::INTERNAL_SERVER_ERROR,
                ));
            }
            Ok(())
        }
    }

    fn server(dispatcher: Arc<RecordingDispatcher>) -> TestServer {
        let state = AppState {
            namespaces: Arc::new(Namespaces::new(HashMap::from([(
                "ex".to_owned(),
                "http://ex.org/".to_owned(),
            )]))),
            source: SourceClient::new("http://localhost:0", "").unwrap(),
            store: dispatcher,
            graph_base: "http://graphs/".into(),
        };
        TestServer::new(router(state)).unwrap()
    }

    #[tokio::test]
    async fn store_builds_and_dispatches_one_replace_statement() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let response = server(Arc::clone(&dispatcher))
            .post("/store/g/entities")
            .json(&json!([
                { "_id": "ex:A", "ex:name": "hello" },
                { "_id": "ex:B", "_deleted": true },
            ]))
            .await;

        response.assert_status_ok();
        let body: JsonValue = response.json();
        assert_eq!(body["entities"], 2);
        assert_eq!(body["skipped_entities"], json!([]));

        let updates = dispatcher.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert!(updates[0].starts_with("WITH <http://graphs/g>"));
        assert!(updates[0].contains(" <http://ex.org/A> <http://ex.org/name> \"hello\" .\n"));
        assert!(updates[0].contains("<http://ex.org/A>\n<http://ex.org/B>\n"));
    }

    #[tokio::test]
    async fn malformed_entities_are_reported_not_fatal() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let response = server(Arc::clone(&dispatcher))
            .post("/store/g/entities")
            .json(&json!([
                { "ex:name": "no id" },
                { "_id": "ex:B", "ex:name": "fine" },
            ]))
            .await;

        response.assert_status_ok();
        let body: JsonValue = response.json();
        assert_eq!(body["skipped_entities"], json!(["entity[1]"]));
        assert_eq!(dispatcher.updates.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_dispatch_is_a_bad_gateway() {
        let dispatcher = Arc::new(RecordingDispatcher {
            fail: true,
            ..RecordingDispatcher::default()
        });
        let response = server(dispatcher)
            .post("/store/g/entities")
            .json(&json!([{ "_id": "ex:A", "ex:name": "x" }]))
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        let body: JsonValue = response.json();
        assert!(body["error"].as_str().unwrap().contains("500"));
    }
}
