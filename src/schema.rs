//! Schema API field type descriptors.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::response::ResponseHeader;

/// Response of `GET {collection}/schema/fieldtypes`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldTypesResponse {
    /// Response header.
    pub response_header: ResponseHeader,

    /// Field types defined in the collection's schema.
    pub field_types: Vec<FieldType>,
}

impl FieldTypesResponse {
    /// Looks up a field type by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldType> {
        self.field_types.iter().find(|t| t.name == name)
    }
}

/// A field type definition.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldType {
    /// Type name, e.g. `text_general`.
    pub name: String,

    /// Implementing class, e.g. `solr.TextField`.
    pub class: String,

    /// Analyzer used for both indexing and querying.
    pub analyzer: Option<Analyzer>,

    /// Analyzer used at index time.
    pub index_analyzer: Option<Analyzer>,

    /// Analyzer used at query time.
    pub query_analyzer: Option<Analyzer>,

    /// Whether the type is multi-valued by default.
    pub multi_valued: Option<bool>,

    /// Whether values are indexed.
    pub indexed: Option<bool>,

    /// Whether values are stored.
    pub stored: Option<bool>,

    /// Whether doc values are enabled.
    pub doc_values: Option<bool>,

    /// Whether documents missing the field sort last.
    pub sort_missing_last: Option<bool>,

    /// Any other attributes, passed through as sent.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

/// An analyzer chain.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Analyzer {
    /// Tokenizer at the head of the chain.
    pub tokenizer: Option<Component>,

    /// Token filters in application order.
    pub filters: Vec<Component>,
}

/// A tokenizer or filter in an analyzer chain.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Component {
    /// Factory class or SPI name.
    pub class: Option<String>,

    /// Component arguments such as `delimiter` or `encoder`.
    #[serde(flatten)]
    pub args: BTreeMap<String, Value>,
}
