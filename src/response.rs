//! Decoded Solr responses.
//!
//! Search results come back with `json.nl=arrntv`, which renders facet counts
//! as ordered `{name, type, value}` objects. Result document fields are kept
//! untyped as [`FieldValue`] and read through checked accessors on
//! [`SearchDocument`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};
use crate::params::SolrParams;

/// A search response.
///
/// The `response` block is required; a body without it is a decode error.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Response header.
    #[serde(default)]
    pub response_header: ResponseHeader,

    /// Matching documents.
    pub response: ResultSet,

    /// Facet counts, present when faceting was requested.
    #[serde(default, rename = "facet_counts")]
    pub facet_counts: FacetCounts,
}

/// Header common to Solr responses.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResponseHeader {
    /// Whether the answering node was connected to ZooKeeper.
    #[serde(rename = "zkConnected")]
    pub zk_connected: Option<bool>,

    /// Solr status code (0 on success).
    pub status: i32,

    /// Server-side query time in milliseconds.
    #[serde(rename = "QTime")]
    pub qtime: u64,

    /// Parameters as the server saw them.
    pub params: SolrParams,
}

/// The result set of a search.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResultSet {
    /// Total number of matches.
    pub num_found: u64,

    /// Offset of the first returned document.
    pub start: u64,

    /// Highest score, when scores were requested.
    pub max_score: Option<f64>,

    /// Returned documents in rank order.
    pub docs: Vec<SearchDocument>,
}

/// Facet counts section of a search response.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FacetCounts {
    /// Counts per facet field, each list in server order.
    pub facet_fields: BTreeMap<String, Vec<FacetCount>>,
}

impl FacetCounts {
    /// Returns the counts for a facet field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&[FacetCount]> {
        self.facet_fields.get(name).map(Vec::as_slice)
    }
}

/// One facet bucket: a term, its Solr type, and the number of matches.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FacetCount {
    /// Term value.
    pub name: String,

    /// Solr type of the count, e.g. `int` or `long`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Number of matching documents.
    pub value: i64,
}

/// An untyped field value from a result document.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FieldValue {
    /// No value (`null` or missing).
    #[default]
    Absent,
    /// A boolean.
    Bool(bool),
    /// A number, kept at full precision.
    Number(Number),
    /// A string.
    String(String),
    /// A multi-valued field.
    Sequence(Vec<FieldValue>),
    /// A nested object, such as a child document.
    Object(Map<String, Value>),
}

impl FieldValue {
    /// Name of the value's kind, as reported in [`Error::TypeMismatch`].
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Object(_) => "object",
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(map),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

/// A result document: field names mapped to untyped values.
///
/// Typed accessors never coerce: asking for a kind the field does not hold
/// returns [`Error::TypeMismatch`]. A missing field is reported as `absent`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SearchDocument(pub BTreeMap<String, FieldValue>);

impl SearchDocument {
    /// Returns `true` if the document has the field.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the raw value of a field, or [`FieldValue::Absent`].
    #[must_use]
    pub fn get(&self, name: &str) -> &FieldValue {
        const ABSENT: &FieldValue = &FieldValue::Absent;
        self.0.get(name).unwrap_or(ABSENT)
    }

    /// Reads a string field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] unless the field holds a string.
    pub fn string(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            FieldValue::String(s) => Ok(s),
            other => Err(mismatch(name, "string", other)),
        }
    }

    /// Reads a numeric field as `f64`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] unless the field holds a number.
    pub fn float64(&self, name: &str) -> Result<f64> {
        match self.get(name) {
            FieldValue::Number(n) => n
                .as_f64()
                .ok_or_else(|| mismatch(name, "float64", &FieldValue::Number(n.clone()))),
            other => Err(mismatch(name, "float64", other)),
        }
    }

    /// Reads a numeric field as `i64`, truncating any fractional part.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] unless the field holds a number.
    #[allow(clippy::cast_possible_truncation)]
    pub fn int64(&self, name: &str) -> Result<i64> {
        match self.get(name) {
            FieldValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(i)
                } else if let Some(f) = n.as_f64() {
                    Ok(f as i64)
                } else {
                    Err(mismatch(name, "int64", &FieldValue::Number(n.clone())))
                }
            }
            other => Err(mismatch(name, "int64", other)),
        }
    }

    /// Reads a multi-valued field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] unless the field holds a sequence.
    pub fn slice(&self, name: &str) -> Result<&[FieldValue]> {
        match self.get(name) {
            FieldValue::Sequence(items) => Ok(items),
            other => Err(mismatch(name, "sequence", other)),
        }
    }

    /// Reads a multi-valued field whose elements are all strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] unless the field holds a sequence of
    /// strings.
    pub fn string_slice(&self, name: &str) -> Result<Vec<&str>> {
        self.slice(name)?
            .iter()
            .map(|item| match item {
                FieldValue::String(s) => Ok(s.as_str()),
                other => Err(mismatch(name, "string sequence", other)),
            })
            .collect()
    }
}

fn mismatch(field: &str, expected: &'static str, found: &FieldValue) -> Error {
    Error::TypeMismatch {
        field: field.to_string(),
        expected,
        found: found.kind(),
    }
}

/// Response envelope of the collections admin API.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectionsApiResponse {
    /// Response header.
    pub response_header: ResponseHeader,

    /// Per-core results keyed by node name, on success.
    pub success: Option<Value>,

    /// Warning text, if any.
    pub warning: Option<String>,

    /// Exception raised by the operation.
    pub exception: Option<ApiException>,

    /// Error block.
    pub error: Option<ApiError>,
}

impl CollectionsApiResponse {
    /// The most specific error message present, preferring `exception.msg`.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.exception
            .as_ref()
            .and_then(|e| e.msg.as_deref())
            .or_else(|| self.error.as_ref().and_then(|e| e.msg.as_deref()))
    }
}

/// `exception` block of a collections API response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiException {
    /// Exception message.
    pub msg: Option<String>,

    /// HTTP status code Solr associated with the exception.
    pub rsp_code: Option<u16>,
}

/// `error` block of a Solr response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiError {
    /// Exception class names and root causes.
    pub metadata: Vec<String>,

    /// Error message.
    pub msg: Option<String>,

    /// HTTP status code.
    pub code: Option<u16>,
}
