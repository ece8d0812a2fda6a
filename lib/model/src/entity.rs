use crate::error::EntityError;
use serde_json::{Map, Value as JsonValue};

/// One decoded property value from a source platform export.
///
/// Anything without an RDF encoding (booleans, nulls, nested objects) decodes
/// to [`Value::Unsupported`] and is skipped later with a warning instead of
/// being dropped silently.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Unsupported,
}

impl From<&JsonValue> for Value {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Number(number) => {
                if let Some(integer) = number.as_i64() {
                    Self::Integer(integer)
                } else if let Some(float) = number.as_f64() {
                    Self::Float(float)
                } else {
                    Self::Unsupported
                }
            }
            JsonValue::String(string) => Self::String(string.clone()),
            JsonValue::Array(items) => Self::List(items.iter().map(Self::from).collect()),
            _ => Self::Unsupported,
        }
    }
}

/// A change entity exported from the source dataset platform.
#[derive(Debug, Clone)]
pub struct Entity {
    /// The entity identifier, still in CURIE form.
    pub id: String,
    pub deleted: bool,
    /// Property keys (CURIEs) and their decoded values, reserved keys removed.
    pub properties: Vec<(String, Value)>,
}

impl Entity {
    /// Decodes one exported JSON object.
    ///
    /// `_id` must be present and a string. Keys starting with `_` are
    /// internal bookkeeping; keys starting with `$ids` carry sameAs
    /// references that are recognized but not mapped yet. Neither becomes a
    /// property.
    pub fn from_json(object: &Map<String, JsonValue>) -> Result<Self, EntityError> {
        let id = match object.get("_id") {
            None => return Err(EntityError::MissingId),
            Some(JsonValue::String(id)) => id.clone(),
            Some(_) => return Err(EntityError::InvalidId),
        };
        let deleted = matches!(object.get("_deleted"), Some(JsonValue::Bool(true)));

        let mut properties = Vec::new();
        for (key, value) in object {
            if key.starts_with('_') || key.starts_with("$ids") {
                continue;
            }
            properties.push((key.clone(), Value::from(value)));
        }

        Ok(Self {
            id,
            deleted,
            properties,
        })
    }
}
