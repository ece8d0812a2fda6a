use oxrdf::IriParseError;

/// An error raised while expanding a CURIE against the namespace registry.
#[derive(Debug, thiserror::Error)]
pub enum ExpansionError {
    #[error("unknown namespace prefix `{0}`")]
    UnknownPrefix(String),
}

/// An error raised while mapping one entity to RDF.
///
/// These are recoverable: the enclosing request skips the entity and reports
/// its identifier instead of aborting.
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    #[error("entity is missing the required `_id` key")]
    MissingId,
    #[error("entity `_id` is not a string")]
    InvalidId,
    #[error(transparent)]
    Expansion(#[from] ExpansionError),
    #[error("expansion produced an invalid IRI: {0}")]
    InvalidIri(#[from] IriParseError),
}
