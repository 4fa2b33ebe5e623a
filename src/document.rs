//! Document value types and the reference-token wire format.

use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DocBaseError;

/// Field carrying the declared type tag in every raw document.
pub const TYPE_TAG: &str = "resourceType";

/// Field carrying the unique id in every raw document.
pub const ID_FIELD: &str = "id";

/// Field inside a reference object holding the `"<TypeName>/<id>"` token.
pub const REFERENCE_KEY: &str = "reference";

/// Handle to a document inside a [`crate::DocBase`].
///
/// Keys are arena slots assigned in creation order. They are the node ids of
/// the link graph, so they must stay `Copy + Ord + Hash`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct DocKey(pub(crate) u32);

impl Display for DocKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A typed, uniquely-identified unit of ingested data.
///
/// The payload is immutable after creation. Link sets are not stored here;
/// they live as edges of the owning [`crate::DocBase`]'s link graph, which
/// keeps the forward/backward sets symmetric by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    key: DocKey,
    id: String,
    display_id: String,
    type_name: String,
    payload: Value,
}

impl Document {
    pub(crate) fn new(key: DocKey, display_id: String, type_name: String, payload: Value) -> Self {
        Document {
            key,
            id: display_id.to_lowercase(),
            display_id,
            type_name,
            payload,
        }
    }

    pub fn key(&self) -> DocKey {
        self.key
    }

    /// Canonical (lowercased) id used for identity comparisons.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Id as it appeared in the raw document.
    pub fn display_id(&self) -> &str {
        &self.display_id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

/// Equality, ordering and hashing are by canonical id only; ids are unique
/// across the whole store regardless of type.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Document {}

impl PartialOrd for Document {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Document {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Document {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.type_name, self.display_id)
    }
}

/// Canonicalize an id for identity comparison.
pub(crate) fn canonical_id(id: &str) -> String {
    id.to_lowercase()
}

/// Pull the id field out of a raw document, accepting string or numeric form.
pub(crate) fn raw_id(raw: &Value) -> Result<String, DocBaseError> {
    match raw.get(ID_FIELD) {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        Some(other) => Err(DocBaseError::Validation(format!(
            "'{ID_FIELD}' must be a string or number, got: {other}"
        ))),
        None => Err(DocBaseError::Validation(format!(
            "missing '{ID_FIELD}' field"
        ))),
    }
}

/// Pull the type tag out of a raw document.
pub(crate) fn raw_type(raw: &Value) -> Result<&str, DocBaseError> {
    raw.get(TYPE_TAG)
        .and_then(Value::as_str)
        .ok_or_else(|| DocBaseError::Validation(format!("missing '{TYPE_TAG}' field")))
}

/// Parse a `"<TypeName>/<id>"` reference token. Both halves must be
/// non-empty; anything else is a malformed token.
pub(crate) fn parse_reference(token: &str) -> Option<(&str, &str)> {
    let (type_name, id) = token.split_once('/')?;
    if type_name.is_empty() || id.is_empty() {
        return None;
    }
    Some((type_name, id))
}
