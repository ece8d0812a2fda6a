use crate::error::ExpansionError;
use std::collections::HashMap;
use tracing::warn;

/// Placeholder IRI substituted for identifiers that do not have CURIE shape.
pub const PLACEHOLDER_IRI: &str = "http://example.org/1";

/// The prefix to namespace IRI table of the source dataset platform.
///
/// Loaded once from the platform metadata before the service starts serving
/// and shared read-only into every request path afterwards.
#[derive(Debug, Clone, Default)]
pub struct Namespaces {
    mappings: HashMap<String, String>,
}

impl Namespaces {
    pub fn new(mappings: HashMap<String, String>) -> Self {
        Self { mappings }
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Expands a `prefix:suffix` identifier to a full IRI string.
    ///
    /// An identifier that does not split into exactly two parts is not a
    /// CURIE; it falls back to [`PLACEHOLDER_IRI`] with a warning. An unknown
    /// prefix is an error.
    pub fn expand(&self, curie: &str) -> Result<String, ExpansionError> {
        match *curie.split(':').collect::<Vec<_>>().as_slice() {
            [prefix, suffix] => self
                .mappings
                .get(prefix)
                .map(|namespace| format!("{namespace}{suffix}"))
                .ok_or_else(|| ExpansionError::UnknownPrefix(prefix.to_owned())),
            _ => {
                warn!(identifier = curie, "no namespace detected, using placeholder");
                Ok(PLACEHOLDER_IRI.to_owned())
            }
        }
    }
}
