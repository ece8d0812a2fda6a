mod entity;
mod error;
mod namespaces;
mod term;

pub use entity::{Entity, Value};
pub use error::{EntityError, ExpansionError};
pub use namespaces::{Namespaces, PLACEHOLDER_IRI};
pub use term::{classify, Term};

// Re-export the oxrdf types that appear in this crate's API.
pub use oxrdf::{IriParseError, Literal, NamedNode};
