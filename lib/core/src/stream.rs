use crate::error::{ExportError, StreamDecodeError};
use crate::store::UpdateDispatcher;
use crate::update::{build_insert_data, BuiltUpdate};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use oxrdf::NamedNode;
use rdf_sink_model::{Entity, Namespaces};
use serde_json::{Map, Value as JsonValue};
use std::pin::pin;
use tracing::{debug, error, warn};

/// Fixed number of entities per dispatched insert statement.
pub const BATCH_SIZE: usize = 100;

/// Incremental decoder for a JSON array of objects, fed byte chunks as they
/// arrive from the network. Only the bytes of the element currently being
/// decoded are buffered, so the array never materializes in memory.
struct JsonArrayDecoder {
    buf: Vec<u8>,
    pos: usize,
    consumed: usize,
    state: DecoderState,
}

enum DecoderState {
    Start,
    FirstElement,
    NextElement,
    Done,
}

enum Decoded<T> {
    /// One complete array element.
    Item(T),
    /// The closing delimiter was consumed.
    End,
    /// More input is needed before a decision can be made.
    Incomplete,
}

impl JsonArrayDecoder {
    fn new() -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
            consumed: 0,
            state: DecoderState::Start,
        }
    }

    fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Decodes the next array element out of the buffered bytes.
    ///
    /// With `input_complete` set, a buffer that cannot make progress is an
    /// error instead of `Incomplete`, so callers never spin on a finished
    /// stream.
    fn next(&mut self, input_complete: bool) -> Result<Decoded<Map<String, JsonValue>>, StreamDecodeError> {
        loop {
            self.skip_whitespace();
            match self.state {
                DecoderState::Start => {
                    match self.peek() {
                        None => return self.starved(input_complete),
                        Some(b'[') => {
                            self.pos += 1;
                            self.state = DecoderState::FirstElement;
                        }
                        Some(_) => {
                            return Err(StreamDecodeError::Delimiter {
                                expected: '[',
                                offset: self.offset(),
                            })
                        }
                    }
                }
                DecoderState::FirstElement => match self.peek() {
                    None => return self.starved(input_complete),
                    Some(b']') => {
                        self.pos += 1;
                        self.state = DecoderState::Done;
                        return Ok(Decoded::End);
                    }
                    Some(_) => return self.element(input_complete),
                },
                DecoderState::NextElement => match self.peek() {
                    None => return self.starved(input_complete),
                    Some(b']') => {
                        self.pos += 1;
                        self.state = DecoderState::Done;
                        return Ok(Decoded::End);
                    }
                    Some(b',') => {
                        self.pos += 1;
                        return self.element(input_complete);
                    }
                    Some(_) => {
                        return Err(StreamDecodeError::Delimiter {
                            expected: ',',
                            offset: self.offset(),
                        })
                    }
                },
                DecoderState::Done => return Ok(Decoded::End),
            }
        }
    }

    fn element(
        &mut self,
        input_complete: bool,
    ) -> Result<Decoded<Map<String, JsonValue>>, StreamDecodeError> {
        self.skip_whitespace();
        let mut elements = serde_json::Deserializer::from_slice(&self.buf[self.pos..])
            .into_iter::<Map<String, JsonValue>>();
        match elements.next() {
            Some(Ok(object)) => {
                self.pos += elements.byte_offset();
                self.state = DecoderState::NextElement;
                self.compact();
                Ok(Decoded::Item(object))
            }
            // A partial element at the end of the buffer parses as EOF.
            Some(Err(error)) if error.is_eof() => self.starved_by(input_complete, error),
            Some(Err(error)) => Err(error.into()),
            None => self.starved(input_complete),
        }
    }

    fn starved<T>(&self, input_complete: bool) -> Result<Decoded<T>, StreamDecodeError> {
        if input_complete {
            Err(StreamDecodeError::UnexpectedEof)
        } else {
            Ok(Decoded::Incomplete)
        }
    }

    fn starved_by<T>(
        &self,
        input_complete: bool,
        error: serde_json::Error,
    ) -> Result<Decoded<T>, StreamDecodeError> {
        if input_complete {
            Err(error.into())
        } else {
            Ok(Decoded::Incomplete)
        }
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self
            .peek()
            .is_some_and(|byte| byte.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }

    /// Byte position within the overall stream, for error reporting.
    fn offset(&self) -> usize {
        self.consumed + self.pos
    }

    /// Drops the consumed prefix so the buffer only holds the current tail.
    fn compact(&mut self) {
        self.consumed += self.pos;
        self.buf.drain(..self.pos);
        self.pos = 0;
    }
}

/// Outcome of a streamed snapshot export.
#[derive(Debug, Default)]
pub struct SnapshotReport {
    /// Entities decoded from the export stream.
    pub entities: u64,
    /// Batches dispatched to the store, including failed dispatches.
    pub batches: u32,
    /// Dispatches the store refused or that failed in transit.
    pub failed_batches: u32,
    /// Identifiers of entities skipped as malformed.
    pub skipped: Vec<String>,
}

/// A human-usable label for a raw entity object, for skip reports.
pub fn entity_label(object: &Map<String, JsonValue>, index: u64) -> String {
    match object.get("_id").and_then(JsonValue::as_str) {
        Some(id) => id.to_owned(),
        None => format!("entity[{index}]"),
    }
}

/// Streams one entity export into `graph`, dispatching an additive insert
/// statement for every [`BATCH_SIZE`] entities and once more for the final
/// partial batch. Dispatches are strictly sequential: the next batch is only
/// read after the previous dispatch returned. A failed dispatch is recorded
/// and the export continues; a decode or transport failure of the stream
/// itself aborts the export with the partial report attached.
pub async fn run_snapshot<S, D>(
    stream: S,
    graph: &NamedNode,
    namespaces: &Namespaces,
    dispatcher: &D,
) -> Result<SnapshotReport, ExportError>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>>,
    D: UpdateDispatcher + ?Sized,
{
    let mut stream = pin!(stream);
    let mut decoder = JsonArrayDecoder::new();
    let mut batch: Vec<Entity> = Vec::new();
    let mut report = SnapshotReport::default();
    let mut input_complete = false;

    loop {
        let decoded = match decoder.next(input_complete) {
            Ok(decoded) => decoded,
            Err(error) => return Err(ExportError::Decode(error, report)),
        };
        match decoded {
            Decoded::Item(object) => {
                report.entities += 1;
                match Entity::from_json(&object) {
                    Ok(entity) => batch.push(entity),
                    Err(error) => {
                        let label = entity_label(&object, report.entities);
                        warn!(entity = %label, %error, "skipping entity");
                        report.skipped.push(label);
                    }
                }
                if batch.len() == BATCH_SIZE {
                    flush(graph, namespaces, &batch, dispatcher, &mut report).await;
                    batch.clear();
                }
            }
            Decoded::End => break,
            Decoded::Incomplete => match stream.next().await {
                Some(Ok(chunk)) => decoder.extend(&chunk),
                Some(Err(error)) => return Err(ExportError::Transport(error, report)),
                None => input_complete = true,
            },
        }
    }

    if !batch.is_empty() {
        flush(graph, namespaces, &batch, dispatcher, &mut report).await;
    }
    Ok(report)
}

async fn flush<D>(
    graph: &NamedNode,
    namespaces: &Namespaces,
    batch: &[Entity],
    dispatcher: &D,
    report: &mut SnapshotReport,
) where
    D: UpdateDispatcher + ?Sized,
{
    let BuiltUpdate { update, skipped } = build_insert_data(graph, batch, namespaces);
    report.skipped.extend(skipped);
    report.batches += 1;
    debug!(batch = report.batches, size = batch.len(), "dispatching insert");
    if let Err(error) = dispatcher.dispatch(&update).await {
        error!(%error, "update dispatch failed");
        report.failed_batches += 1;
    }
}
