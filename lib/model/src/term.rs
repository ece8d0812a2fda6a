use crate::entity::Value;
use crate::error::EntityError;
use crate::namespaces::Namespaces;
use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNode};
use tracing::warn;

/// Marks a string value as a reference to another entity.
const REFERENCE_TAG: &str = "~:";
/// Marks a string value as an `xsd:dateTime` literal.
const DATETIME_TAG: &str = "~t";

/// The RDF encoding of one property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Node(NamedNode),
    Literal(Literal),
    List(Vec<Term>),
}

/// Determines the RDF encoding of a decoded value.
///
/// Returns `Ok(None)` for values that have no RDF encoding; callers skip
/// those with a warning rather than failing the entity. List elements are
/// classified with the scalar rules; unsupported elements are dropped from
/// the list, again with a warning only.
pub fn classify(value: &Value, namespaces: &Namespaces) -> Result<Option<Term>, EntityError> {
    Ok(match value {
        Value::Integer(integer) => Some(Term::Literal(integer_literal(*integer))),
        Value::Float(float) => Some(Term::Literal(numeric_literal(*float))),
        Value::String(string) => Some(classify_string(string, namespaces)?),
        Value::List(items) => {
            let mut terms = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::List(_) | Value::Unsupported => {
                        warn!("skipping list element without an RDF encoding");
                    }
                    scalar => {
                        if let Some(term) = classify(scalar, namespaces)? {
                            terms.push(term);
                        }
                    }
                }
            }
            Some(Term::List(terms))
        }
        Value::Unsupported => None,
    })
}

fn classify_string(value: &str, namespaces: &Namespaces) -> Result<Term, EntityError> {
    if let Some(curie) = value.strip_prefix(REFERENCE_TAG) {
        let iri = namespaces.expand(curie)?;
        Ok(Term::Node(NamedNode::new(iri)?))
    } else if let Some(datetime) = value.strip_prefix(DATETIME_TAG) {
        Ok(Term::Literal(Literal::new_typed_literal(
            datetime,
            xsd::DATE_TIME,
        )))
    } else {
        Ok(Term::Literal(Literal::new_simple_literal(value)))
    }
}

fn integer_literal(value: i64) -> Literal {
    Literal::new_typed_literal(value.to_string(), xsd::INTEGER)
}

/// Numbers with a zero fractional part collapse to `xsd:integer`; everything
/// else keeps the fixed six-digit rendering existing consumers expect.
#[allow(
    clippy::cast_possible_truncation,
    reason = "the zero-fraction check keeps the cast exact"
)]
fn numeric_literal(value: f64) -> Literal {
    if value == value.trunc() {
        integer_literal(value as i64)
    } else {
        Literal::new_typed_literal(format!("{value:.6}"), xsd::FLOAT)
    }
}
