use chrono::NaiveDate;
use oxrdf::{IriParseError, NamedNode};
use rdf_sink_model::{classify, Entity, EntityError, Namespaces, Term};
use tracing::warn;

/// Forms the target graph IRI from the configured base and a caller suffix.
pub fn graph_iri(base: &str, name: &str) -> Result<NamedNode, IriParseError> {
    NamedNode::new(format!("{base}{name}"))
}

/// Snapshot graphs additionally carry the day, so each day's export lands in
/// its own named graph.
pub fn snapshot_graph_iri(
    base: &str,
    name: &str,
    date: NaiveDate,
) -> Result<NamedNode, IriParseError> {
    NamedNode::new(format!("{base}{name}-{}", date.format("%Y-%m-%d")))
}

/// An update statement built from one batch of entities, together with the
/// identifiers of entities that were skipped as malformed.
#[derive(Debug)]
pub struct BuiltUpdate {
    pub update: String,
    pub skipped: Vec<String>,
}

/// Builds the additive `INSERT DATA` statement used by the snapshot path.
///
/// Deleted entities contribute nothing, not even a tombstone. Entities that
/// fail to map (unknown prefix, invalid IRI) are skipped and recorded.
pub fn build_insert_data(
    graph: &NamedNode,
    entities: &[Entity],
    namespaces: &Namespaces,
) -> BuiltUpdate {
    let mut triples = String::new();
    let mut skipped = Vec::new();

    for entity in entities {
        if entity.deleted {
            continue;
        }
        match entity_triples(entity, namespaces) {
            Ok(lines) => triples.push_str(&lines),
            Err(error) => {
                warn!(id = %entity.id, %error, "skipping entity");
                skipped.push(entity.id.clone());
            }
        }
    }

    BuiltUpdate {
        update: format!("INSERT DATA {{ GRAPH {graph} {{\n{triples}}} }}\n"),
        skipped,
    }
}

/// Builds the atomic replace statement used by the incremental upsert path.
///
/// The `VALUES ?subject` set binds every subject present in the batch,
/// including deleted entities, so all of their existing triples are removed.
/// Deleted entities contribute zero insert triples, which realizes a
/// delete-as-tombstone without explicit delete markers. Subjects not in the
/// batch are untouched.
pub fn build_replace(
    graph: &NamedNode,
    entities: &[Entity],
    namespaces: &Namespaces,
) -> BuiltUpdate {
    let mut values = String::new();
    let mut triples = String::new();
    let mut skipped = Vec::new();

    for entity in entities {
        let subject = match expand_subject(entity, namespaces) {
            Ok(subject) => subject,
            Err(error) => {
                warn!(id = %entity.id, %error, "skipping entity");
                skipped.push(entity.id.clone());
                continue;
            }
        };
        values.push_str(&format!("{subject}\n"));

        if entity.deleted {
            continue;
        }
        match subject_triples(&subject, entity, namespaces) {
            Ok(lines) => triples.push_str(&lines),
            Err(error) => {
                warn!(id = %entity.id, %error, "skipping entity");
                skipped.push(entity.id.clone());
            }
        }
    }

    BuiltUpdate {
        update: format!(
            "WITH {graph}\nDELETE {{ ?subject ?p ?o }}\nINSERT {{\n{triples}}}\n\
             WHERE {{ VALUES ?subject {{\n{values}}} ?subject ?p ?o }}\n"
        ),
        skipped,
    }
}

fn expand_subject(entity: &Entity, namespaces: &Namespaces) -> Result<NamedNode, EntityError> {
    Ok(NamedNode::new(namespaces.expand(&entity.id)?)?)
}

fn entity_triples(entity: &Entity, namespaces: &Namespaces) -> Result<String, EntityError> {
    let subject = expand_subject(entity, namespaces)?;
    subject_triples(&subject, entity, namespaces)
}

/// Renders one entity's properties as triple lines for an insert template.
fn subject_triples(
    subject: &NamedNode,
    entity: &Entity,
    namespaces: &Namespaces,
) -> Result<String, EntityError> {
    let mut lines = String::new();
    for (key, value) in &entity.properties {
        let predicate = NamedNode::new(namespaces.expand(key)?)?;
        match classify(value, namespaces)? {
            Some(term) => write_triple(&mut lines, subject, &predicate, &term),
            None => warn!(id = %entity.id, key, "skipping value without an RDF encoding"),
        }
    }
    Ok(lines)
}

fn write_triple(out: &mut String, subject: &NamedNode, predicate: &NamedNode, object: &Term) {
    match object {
        Term::Node(node) => out.push_str(&format!(" {subject} {predicate} {node} .\n")),
        Term::Literal(literal) => out.push_str(&format!(" {subject} {predicate} {literal} .\n")),
        Term::List(terms) => {
            for term in terms {
                write_triple(out, subject, predicate, term);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn namespaces() -> Namespaces {
        Namespaces::new(HashMap::from([(
            "ex".to_owned(),
            "http://ex.org/".to_owned(),
        )]))
    }

    fn entity(value: serde_json::Value) -> Entity {
        Entity::from_json(value.as_object().unwrap()).unwrap()
    }

    fn graph() -> NamedNode {
        graph_iri("http://graphs/", "g").unwrap()
    }

    #[test]
    fn graph_iris_concatenate_base_and_name() {
        assert_eq!(graph().as_str(), "http://graphs/g");
        let date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert_eq!(
            snapshot_graph_iri("http://graphs/", "g", date).unwrap().as_str(),
            "http://graphs/g-2020-01-02"
        );
    }

    #[test]
    fn insert_data_renders_typed_and_plain_objects() {
        let built = build_insert_data(
            &graph(),
            &[entity(json!({
                "_id": "ex:A",
                "ex:age": 42,
                "ex:height": 1.75,
                "ex:knows": "~:ex:B",
                "ex:name": "hello",
                "ex:seen": "~t2020-01-01T00:00:00Z",
            }))],
            &namespaces(),
        );

        assert!(built.skipped.is_empty());
        assert!(built.update.starts_with("INSERT DATA { GRAPH <http://graphs/g> {"));
        assert!(built.update.contains(
            " <http://ex.org/A> <http://ex.org/age> \"42\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n"
        ));
        assert!(built.update.contains(
            " <http://ex.org/A> <http://ex.org/height> \"1.750000\"^^<http://www.w3.org/2001/XMLSchema#float> .\n"
        ));
        assert!(built
            .update
            .contains(" <http://ex.org/A> <http://ex.org/knows> <http://ex.org/B> .\n"));
        assert!(built
            .update
            .contains(" <http://ex.org/A> <http://ex.org/name> \"hello\" .\n"));
        assert!(built.update.contains(
            " <http://ex.org/A> <http://ex.org/seen> \"2020-01-01T00:00:00Z\"^^<http://www.w3.org/2001/XMLSchema#dateTime> .\n"
        ));
    }

    #[test]
    fn insert_data_expands_lists_into_one_triple_per_element() {
        let built = build_insert_data(
            &graph(),
            &[entity(json!({ "_id": "ex:A", "ex:tags": ["a", "b"] }))],
            &namespaces(),
        );

        assert!(built
            .update
            .contains(" <http://ex.org/A> <http://ex.org/tags> \"a\" .\n"));
        assert!(built
            .update
            .contains(" <http://ex.org/A> <http://ex.org/tags> \"b\" .\n"));
    }

    #[test]
    fn literals_with_quotes_and_newlines_are_escaped() {
        let built = build_insert_data(
            &graph(),
            &[entity(json!({ "_id": "ex:A", "ex:name": "say \"hi\"\nplease" }))],
            &namespaces(),
        );

        assert!(built
            .update
            .contains(" <http://ex.org/A> <http://ex.org/name> \"say \\\"hi\\\"\\nplease\" .\n"));
    }

    #[test]
    fn deleted_entities_contribute_no_insert_triples() {
        let built = build_insert_data(
            &graph(),
            &[entity(json!({ "_id": "ex:A", "_deleted": true, "ex:name": "x" }))],
            &namespaces(),
        );
        assert_eq!(built.update, "INSERT DATA { GRAPH <http://graphs/g> {\n} }\n");
        assert!(built.skipped.is_empty());
    }

    #[test]
    fn malformed_entities_are_skipped_and_reported() {
        let built = build_insert_data(
            &graph(),
            &[
                entity(json!({ "_id": "ex:A", "ex:name": "ok" })),
                entity(json!({ "_id": "nope:B", "ex:name": "bad subject" })),
                entity(json!({ "_id": "ex:C", "nope:name": "bad predicate" })),
            ],
            &namespaces(),
        );

        assert_eq!(built.skipped, vec!["nope:B".to_owned(), "ex:C".to_owned()]);
        assert!(built.update.contains("<http://ex.org/A>"));
        assert!(!built.update.contains("bad subject"));
        assert!(!built.update.contains("bad predicate"));
    }

    #[test]
    fn replace_upserts_one_entity() {
        let built = build_replace(
            &graph(),
            &[entity(json!({ "_id": "ex:A", "ex:name": "hello" }))],
            &namespaces(),
        );

        assert_eq!(
            built.update,
            "WITH <http://graphs/g>\n\
             DELETE { ?subject ?p ?o }\n\
             INSERT {\n <http://ex.org/A> <http://ex.org/name> \"hello\" .\n}\n\
             WHERE { VALUES ?subject {\n<http://ex.org/A>\n} ?subject ?p ?o }\n"
        );
        assert!(built.skipped.is_empty());
    }

    #[test]
    fn replace_keeps_deleted_subjects_in_the_values_set() {
        let built = build_replace(
            &graph(),
            &[
                entity(json!({ "_id": "ex:A", "_deleted": true, "ex:name": "gone" })),
                entity(json!({ "_id": "ex:B", "ex:name": "kept" })),
            ],
            &namespaces(),
        );

        assert!(built.update.contains("<http://ex.org/A>\n<http://ex.org/B>\n"));
        assert!(!built.update.contains("gone"));
        assert!(built.update.contains(" <http://ex.org/B> <http://ex.org/name> \"kept\" .\n"));
    }

    #[test]
    fn replace_skips_unexpandable_subjects_entirely() {
        let built = build_replace(
            &graph(),
            &[entity(json!({ "_id": "nope:A", "ex:name": "x" }))],
            &namespaces(),
        );

        assert_eq!(built.skipped, vec!["nope:A".to_owned()]);
        assert!(built.update.contains("VALUES ?subject {\n}"));
    }
}
