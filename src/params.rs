//! Query parameters and their form encoding.

use serde::{Deserialize, Deserializer};

/// The `json.nl` mode that renders named lists as `{name, type, value}`
/// objects. Facet count decoding only understands this shape, so it is sent
/// with every query.
pub const JSON_NL_ARRNTV: &str = "arrntv";

/// Facet field names.
///
/// Solr echoes a repeated parameter as a list but a single one as a bare
/// string. Both shapes decode to the same ordered list; anything else is a
/// decode error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FacetField(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for FacetField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match OneOrMany::deserialize(deserializer) {
            Ok(OneOrMany::One(name)) => Ok(Self(vec![name])),
            Ok(OneOrMany::Many(names)) => Ok(Self(names)),
            Err(_) => Err(serde::de::Error::custom(
                "facet field must be a string or a list of strings",
            )),
        }
    }
}

impl FacetField {
    /// Returns the field names.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns `true` if no facet fields are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FacetField {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Request parameters for a search.
///
/// Only options that differ from their defaults are transmitted. The same type
/// decodes the `params` block Solr echoes back in a response header, where
/// every value arrives as a string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SolrParams {
    /// Query string (`q`).
    pub q: Option<String>,

    /// Default query parser (`defType`), e.g. `edismax`.
    #[serde(rename = "defType")]
    pub def_type: Option<String>,

    /// Enables faceting (`facet=true`).
    #[serde(deserialize_with = "de_flag")]
    pub facet: bool,

    /// Fields to facet on (`facet.field`, repeated).
    #[serde(rename = "facet.field")]
    pub facet_field: FacetField,

    /// Query fields with optional boosts (`qf`).
    pub qf: Option<String>,

    /// Fields to return (`fl`).
    pub fl: Option<String>,

    /// Maximum number of documents to return (`rows`).
    #[serde(deserialize_with = "de_rows")]
    pub rows: Option<u32>,

    /// Boost query (`bq`).
    pub bq: Option<String>,

    /// Named-list rendering mode (`json.nl`). Ignored on encode: the client
    /// always sends [`JSON_NL_ARRNTV`].
    #[serde(rename = "json.nl")]
    pub json_nl: Option<String>,
}

impl SolrParams {
    /// Creates parameters for a query string.
    #[must_use]
    pub fn query(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Self::default()
        }
    }

    /// Sets the default query parser.
    #[must_use]
    pub fn def_type(mut self, def_type: impl Into<String>) -> Self {
        self.def_type = Some(def_type.into());
        self
    }

    /// Turns faceting on for the given fields.
    #[must_use]
    pub fn facet_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facet = true;
        self.facet_field = fields.into_iter().collect();
        self
    }

    /// Sets the query fields.
    #[must_use]
    pub fn qf(mut self, qf: impl Into<String>) -> Self {
        self.qf = Some(qf.into());
        self
    }

    /// Sets the returned fields.
    #[must_use]
    pub fn fl(mut self, fl: impl Into<String>) -> Self {
        self.fl = Some(fl.into());
        self
    }

    /// Limits the number of returned documents.
    #[must_use]
    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Sets the boost query.
    #[must_use]
    pub fn bq(mut self, bq: impl Into<String>) -> Self {
        self.bq = Some(bq.into());
        self
    }

    /// Returns the parameters as form pairs, skipping defaults and forcing
    /// `json.nl` to [`JSON_NL_ARRNTV`].
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        let optional = [
            ("q", &self.q),
            ("defType", &self.def_type),
            ("qf", &self.qf),
            ("fl", &self.fl),
            ("bq", &self.bq),
        ];

        for (key, value) in optional {
            if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
                pairs.push((key, value.clone()));
            }
        }

        if self.facet {
            pairs.push(("facet", "true".to_string()));
        }

        for field in self.facet_field.as_slice() {
            pairs.push(("facet.field", field.clone()));
        }

        if let Some(rows) = self.rows {
            pairs.push(("rows", rows.to_string()));
        }

        pairs.push(("json.nl", JSON_NL_ARRNTV.to_string()));
        pairs
    }

    /// Encodes the parameters as an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_pairs())
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Number(u64),
    Text(String),
}

fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Scalar::Bool(flag)) => Ok(flag),
        Some(Scalar::Number(n)) => Ok(n != 0),
        Some(Scalar::Text(text)) => Ok(matches!(text.as_str(), "true" | "on" | "yes")),
    }
}

fn de_rows<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Number(n)) => u32::try_from(n).map(Some).map_err(serde::de::Error::custom),
        Some(Scalar::Text(text)) => text.parse().map(Some).map_err(serde::de::Error::custom),
        Some(Scalar::Bool(_)) => Err(serde::de::Error::custom("rows must be a number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // FacetField decode tests

    #[test]
    fn facet_field_from_bare_string() {
        let field: FacetField = serde_json::from_str(r#""x""#).unwrap();
        assert_eq!(field.as_slice(), ["x"]);
    }

    #[test]
    fn facet_field_from_list() {
        let field: FacetField = serde_json::from_str(r#"["x","y"]"#).unwrap();
        assert_eq!(field.as_slice(), ["x", "y"]);
    }

    #[test]
    fn facet_field_rejects_number() {
        let err = serde_json::from_str::<FacetField>("5").unwrap_err();
        let err: crate::Error = err.into();
        assert!(matches!(err, crate::Error::Decode(_)));
    }

    #[test]
    fn facet_field_rejects_mixed_list() {
        assert!(serde_json::from_str::<FacetField>(r#"["x",1]"#).is_err());
    }

    // Encoding tests

    #[test]
    fn default_params_send_only_json_nl() {
        let params = SolrParams::default();
        assert_eq!(params.encode(), "json.nl=arrntv");
    }

    #[test]
    fn json_nl_is_always_forced() {
        let params = SolrParams {
            json_nl: Some("map".to_string()),
            ..SolrParams::query("*:*")
        };

        let pairs = params.to_pairs();
        let json_nl: Vec<_> = pairs.iter().filter(|(k, _)| *k == "json.nl").collect();

        assert_eq!(json_nl, [&("json.nl", "arrntv".to_string())]);
    }

    #[test]
    fn facet_fields_repeat_the_key() {
        let params = SolrParams::query("*:*").facet_fields(["test_s", "test_txt"]);

        assert_eq!(
            params.encode(),
            "q=*%3A*&facet=true&facet.field=test_s&facet.field=test_txt&json.nl=arrntv"
        );
    }

    #[test]
    fn every_option_is_encoded() {
        let params = SolrParams::query("title:rust")
            .def_type("edismax")
            .qf("title^2 body")
            .fl("id,title")
            .rows(25)
            .bq("featured:true");

        assert_eq!(
            params.to_pairs(),
            vec![
                ("q", "title:rust".to_string()),
                ("defType", "edismax".to_string()),
                ("qf", "title^2 body".to_string()),
                ("fl", "id,title".to_string()),
                ("bq", "featured:true".to_string()),
                ("rows", "25".to_string()),
                ("json.nl", "arrntv".to_string()),
            ]
        );
    }

    #[test]
    fn empty_strings_are_treated_as_unset() {
        let params = SolrParams {
            q: Some(String::new()),
            ..SolrParams::default()
        };

        assert_eq!(params.to_pairs(), vec![("json.nl", "arrntv".to_string())]);
    }

    // Echoed params decode tests

    #[test]
    fn decodes_echoed_params() {
        let params: SolrParams = serde_json::from_str(
            r#"{"q":"*:*","facet.field":"test_s","json.nl":"arrntv","facet":"true","rows":"10","wt":"json"}"#,
        )
        .unwrap();

        assert_eq!(params.q.as_deref(), Some("*:*"));
        assert!(params.facet);
        assert_eq!(params.facet_field.as_slice(), ["test_s"]);
        assert_eq!(params.rows, Some(10));
        assert_eq!(params.json_nl.as_deref(), Some(JSON_NL_ARRNTV));
    }

    #[test]
    fn decodes_empty_params() {
        let params: SolrParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, SolrParams::default());
    }
}
