//! Multi-valued documents for indexing.
//!
//! Every field is sent to Solr as an array of strings, even when it is
//! logically single-valued. A document is identified by its `id` field, which
//! must hold exactly one non-empty value before it can join a
//! [`SolrDocumentCollection`].

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// Name of the identity field.
pub const ID_FIELD: &str = "id";

/// A document whose fields all hold an ordered list of string values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SolrDocument {
    fields: BTreeMap<String, Vec<String>>,
}

impl SolrDocument {
    /// Creates a document seeded with a single-valued `id` field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `id` is empty.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::Validation("document id must not be empty".to_string()));
        }

        let mut fields = BTreeMap::new();
        fields.insert(ID_FIELD.to_string(), vec![id]);
        Ok(Self { fields })
    }

    /// Returns the document identity, or `None` if the `id` field is missing,
    /// empty, or multi-valued.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self.fields.get(ID_FIELD).map(Vec::as_slice) {
            Some([id]) if !id.is_empty() => Some(id.as_str()),
            _ => None,
        }
    }

    /// Replaces the document identity.
    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.fields.insert(ID_FIELD.to_string(), vec![id.into()]);
        self
    }

    /// Sets a field, overwriting any previous values.
    pub fn set_field<I, S>(&mut self, name: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Builder form of [`set_field`](Self::set_field).
    #[must_use]
    pub fn with_field<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_field(name, values);
        self
    }

    /// Returns the values of a field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldNotFound`] if the document has no such field.
    pub fn field(&self, name: &str) -> Result<&[String]> {
        self.fields
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::FieldNotFound {
                id: self.id().unwrap_or_default().to_string(),
                field: name.to_string(),
            })
    }

    /// Returns `true` if the document has a field with this name.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterates over all fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Encodes the document as the JSON object Solr's update handler expects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if serialization fails.
    pub fn solr_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// `id` first, then the remaining fields in name order.
impl Serialize for SolrDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;

        if let Some(id) = self.fields.get(ID_FIELD) {
            map.serialize_entry(ID_FIELD, id)?;
        }

        for (name, values) in self.fields.iter().filter(|(name, _)| *name != ID_FIELD) {
            map.serialize_entry(name, values)?;
        }

        map.end()
    }
}

/// A set of documents keyed by identity. Adding a document whose id is already
/// present replaces the earlier one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolrDocumentCollection {
    docs: BTreeMap<String, SolrDocument>,
}

impl SolrDocumentCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document, replacing any document with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the document has no usable id.
    pub fn add_doc(&mut self, doc: SolrDocument) -> Result<()> {
        let Some(id) = doc.id().map(str::to_string) else {
            return Err(Error::Validation(
                "document is missing an id; every document needs a single-valued id field"
                    .to_string(),
            ));
        };

        self.docs.insert(id, doc);
        Ok(())
    }

    /// Removes a document by id, returning it if it was present.
    pub fn delete_doc(&mut self, id: &str) -> Option<SolrDocument> {
        self.docs.remove(id)
    }

    /// Returns a document by id.
    #[must_use]
    pub fn get_doc(&self, id: &str) -> Option<&SolrDocument> {
        self.docs.get(id)
    }

    /// Number of documents held.
    #[must_use]
    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    /// Returns `true` if the collection holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Iterates over the documents.
    pub fn iter(&self) -> impl Iterator<Item = &SolrDocument> {
        self.docs.values()
    }

    /// Encodes each member document and joins them with `",\n"`.
    ///
    /// The result has no enclosing brackets; see [`bulk_json`](Self::bulk_json)
    /// for the array form the update handler takes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] naming the offending document if one fails to
    /// serialize.
    pub fn solr_json(&self) -> Result<String> {
        let encoded = self
            .docs
            .iter()
            .map(|(id, doc)| {
                doc.solr_json()
                    .map_err(|e| Error::Decode(format!("document {id}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(encoded.join(",\n"))
    }

    /// Encodes the collection as a JSON array for the bulk update endpoint.
    ///
    /// # Errors
    ///
    /// See [`solr_json`](Self::solr_json).
    pub fn bulk_json(&self) -> Result<String> {
        Ok(format!("[{}]", self.solr_json()?))
    }
}

impl<'a> IntoIterator for &'a SolrDocumentCollection {
    type Item = &'a SolrDocument;
    type IntoIter = std::collections::btree_map::Values<'a, String, SolrDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_docs() -> SolrDocumentCollection {
        let mut docs = SolrDocumentCollection::new();
        docs.add_doc(
            SolrDocument::new("1")
                .unwrap()
                .with_field("test_txt", ["test1", "test2", "test3"])
                .with_field("test_s", ["test1"]),
        )
        .unwrap();
        docs.add_doc(
            SolrDocument::new("2")
                .unwrap()
                .with_field("test_txt", ["test3", "test4", "test5"])
                .with_field("test_s", ["test2"]),
        )
        .unwrap();
        docs
    }

    // SolrDocument tests

    #[test]
    fn new_document_seeds_id() {
        let doc = SolrDocument::new("1").unwrap();

        assert_eq!(doc.id(), Some("1"));
        assert_eq!(doc.field("id").unwrap(), ["1"]);
    }

    #[test]
    fn new_document_rejects_empty_id() {
        let err = SolrDocument::new("").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn set_field_overwrites() {
        let mut doc = SolrDocument::new("1").unwrap();
        doc.set_field("test", ["a", "b"]);
        doc.set_field("test", ["c"]);

        assert_eq!(doc.field("test").unwrap(), ["c"]);
    }

    #[test]
    fn field_missing_is_not_found() {
        let doc = SolrDocument::new("7").unwrap();

        match doc.field("test2") {
            Err(Error::FieldNotFound { id, field }) => {
                assert_eq!(id, "7");
                assert_eq!(field, "test2");
            }
            other => panic!("expected FieldNotFound, got {other:?}"),
        }
    }

    #[test]
    fn exists_probes_without_failing() {
        let doc = SolrDocument::new("1")
            .unwrap()
            .with_field("test", ["string1", "string2"]);

        assert!(doc.exists("test"));
        assert!(!doc.exists("test2"));
    }

    #[test]
    fn solr_json_keeps_single_values_as_arrays() {
        let doc = SolrDocument::new("1").unwrap().with_field("f", ["a", "b"]);
        assert_eq!(doc.solr_json().unwrap(), r#"{"id":["1"],"f":["a","b"]}"#);
    }

    #[test]
    fn solr_json_puts_id_first() {
        let doc = SolrDocument::new("9")
            .unwrap()
            .with_field("a_s", ["x"])
            .with_field("z_s", ["y"]);

        assert_eq!(
            doc.solr_json().unwrap(),
            r#"{"id":["9"],"a_s":["x"],"z_s":["y"]}"#
        );
    }

    #[test]
    fn id_requires_single_non_empty_value() {
        let mut doc = SolrDocument::new("1").unwrap();
        doc.set_field("id", ["1", "2"]);
        assert_eq!(doc.id(), None);

        doc.set_id("");
        assert_eq!(doc.id(), None);

        doc.set_id("3");
        assert_eq!(doc.id(), Some("3"));
    }

    #[test]
    fn document_decodes_from_json_object() {
        let doc: SolrDocument = serde_json::from_str(r#"{"id":["4"],"tags":["a"]}"#).unwrap();

        assert_eq!(doc.id(), Some("4"));
        assert_eq!(doc.field("tags").unwrap(), ["a"]);
    }

    // SolrDocumentCollection tests

    #[test]
    fn add_doc_rejects_missing_id() {
        let mut docs = SolrDocumentCollection::new();
        let mut doc = SolrDocument::new("1").unwrap();
        doc.set_id("");

        assert!(matches!(docs.add_doc(doc), Err(Error::Validation(_))));
        assert!(docs.is_empty());
    }

    #[test]
    fn add_doc_last_write_wins() {
        let mut docs = SolrDocumentCollection::new();
        docs.add_doc(SolrDocument::new("1").unwrap().with_field("v", ["first"]))
            .unwrap();
        docs.add_doc(SolrDocument::new("1").unwrap().with_field("v", ["second"]))
            .unwrap();

        assert_eq!(docs.num_docs(), 1);
        assert_eq!(docs.get_doc("1").unwrap().field("v").unwrap(), ["second"]);
    }

    #[test]
    fn get_and_delete_doc() {
        let mut docs = fake_docs();

        assert!(docs.get_doc("1").is_some());
        assert!(docs.get_doc("3").is_none());

        assert!(docs.delete_doc("1").is_some());
        assert!(docs.delete_doc("1").is_none());
        assert_eq!(docs.num_docs(), 1);
    }

    #[test]
    fn collection_json_joins_without_trailing_separator() {
        let docs = fake_docs();
        let json = docs.solr_json().unwrap();

        assert_eq!(
            json,
            concat!(
                r#"{"id":["1"],"test_s":["test1"],"test_txt":["test1","test2","test3"]}"#,
                ",\n",
                r#"{"id":["2"],"test_s":["test2"],"test_txt":["test3","test4","test5"]}"#,
            )
        );
    }

    #[test]
    fn empty_collection_encodes_to_nothing() {
        let docs = SolrDocumentCollection::new();

        assert_eq!(docs.solr_json().unwrap(), "");
        assert_eq!(docs.bulk_json().unwrap(), "[]");
    }

    #[test]
    fn bulk_json_is_a_valid_array() {
        let docs = fake_docs();
        let parsed: Vec<SolrDocument> = serde_json::from_str(&docs.bulk_json().unwrap()).unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].id(), Some("2"));
    }

    #[test]
    fn iterates_over_documents() {
        let docs = fake_docs();
        let ids: Vec<_> = docs.iter().filter_map(SolrDocument::id).collect();

        assert_eq!(ids, ["1", "2"]);
        assert_eq!((&docs).into_iter().count(), 2);
    }
}
