//! Port for the document store backing every forum collection.
//!
//! Records are JSON objects addressed by a string `id` field and grouped into
//! named [`Collection`]s. The domain only relies on the primitives below:
//! equality filters over top-level fields, field merges, deletes and a
//! conditional group-by sum. Adapters are free to translate these into any
//! query language.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::define_port_error;

/// A stored record.
pub type Document = Map<String, Value>;

/// Field every document carries as its unique key within a collection.
pub const ID_FIELD: &str = "id";

/// Named collections known to the forum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Profiles,
    Communities,
    Posts,
    Comments,
    PostVotes,
    CommentVotes,
}

impl Collection {
    /// Stable storage name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Profiles => "profiles",
            Self::Communities => "communities",
            Self::Posts => "posts",
            Self::Comments => "comments",
            Self::PostVotes => "post_votes",
            Self::CommentVotes => "comment_votes",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conjunction of top-level field equalities. An empty filter matches every
/// document in the collection.
///
/// # Examples
/// ```
/// use forum_backend::domain::ports::Filter;
/// use serde_json::json;
///
/// let filter = Filter::new().eq("subject_id", "p1").eq("value", 1);
/// let doc = json!({ "subject_id": "p1", "value": 1, "voter": "alice" });
/// assert!(filter.matches(doc.as_object().expect("object")));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Document,
}

impl Filter {
    /// Filter matching every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on the document id.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq(ID_FIELD, id.into())
    }

    /// Require `field` to equal `value`.
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.insert(field.into(), value.into());
        self
    }

    /// Whether `document` satisfies every clause.
    pub fn matches(&self, document: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    /// Clauses as a JSON object, suitable for containment queries.
    pub fn as_document(&self) -> &Document {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Counts documents in a group whose `field` equals `equals`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalSum {
    /// Output name of the total.
    pub name: String,
    pub field: String,
    pub equals: Value,
}

impl ConditionalSum {
    pub fn new(name: impl Into<String>, field: impl Into<String>, equals: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            equals: equals.into(),
        }
    }
}

/// Group the documents matching `filter` by `group_key` and compute each
/// conditional sum per group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupByQuery {
    pub filter: Filter,
    pub group_key: String,
    pub sums: Vec<ConditionalSum>,
}

/// Totals produced for one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupTotals {
    /// Value of the group key shared by the group's documents.
    pub key: Value,
    pub sums: BTreeMap<String, u64>,
}

impl GroupTotals {
    /// Named total, zero when the sum was not produced.
    pub fn sum(&self, name: &str) -> u64 {
        self.sums.get(name).copied().unwrap_or(0)
    }
}

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The store could not be reached or a connection was unavailable.
        Connection { message: String } =>
            "document store connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } =>
            "document store query failed: {message}",
        /// An insert collided with an existing id.
        DuplicateKey { collection: String, id: String } =>
            "document {collection}/{id} already exists",
        /// A document could not be encoded or decoded.
        InvalidDocument { message: String } =>
            "invalid document: {message}",
    }
}

/// Port over named collections of JSON documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// First document matching `filter`, if any.
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, DocumentStoreError>;

    /// Every document matching `filter`. Ordering is unspecified.
    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, DocumentStoreError>;

    /// Insert a document keyed by its `id` field.
    ///
    /// Fails with [`DocumentStoreError::DuplicateKey`] when the id is taken and
    /// [`DocumentStoreError::InvalidDocument`] when `id` is missing or not a
    /// string.
    async fn insert(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<(), DocumentStoreError>;

    /// Merge `fields` into every document matching `filter` and return how
    /// many matched. The `id` field cannot be rewritten.
    async fn update_fields(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Document,
    ) -> Result<u64, DocumentStoreError>;

    /// Remove every document matching `filter` and return how many were removed.
    async fn delete(&self, collection: Collection, filter: &Filter)
    -> Result<u64, DocumentStoreError>;

    /// Number of documents matching `filter`.
    async fn count(&self, collection: Collection, filter: &Filter)
    -> Result<u64, DocumentStoreError>;

    /// Conditional sums per group. Groups with no matching documents are
    /// absent from the result.
    async fn aggregate_group_by(
        &self,
        collection: Collection,
        query: &GroupByQuery,
    ) -> Result<Vec<GroupTotals>, DocumentStoreError>;
}

/// Serialise a domain record into a document.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, DocumentStoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DocumentStoreError::invalid_document(format!(
            "expected an object, got {other}"
        ))),
        Err(err) => Err(DocumentStoreError::invalid_document(err.to_string())),
    }
}

/// Deserialise a document into a domain record.
pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, DocumentStoreError> {
    serde_json::from_value(Value::Object(document))
        .map_err(|err| DocumentStoreError::invalid_document(err.to_string()))
}

/// Extract the string id of a document.
pub fn document_id(document: &Document) -> Result<&str, DocumentStoreError> {
    document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .ok_or_else(|| DocumentStoreError::invalid_document("document has no string id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[rstest]
    #[case(Filter::new(), true)]
    #[case(Filter::new().eq("owner", "alice"), true)]
    #[case(Filter::new().eq("owner", "bob"), false)]
    #[case(Filter::new().eq("owner", "alice").eq("score", 3), true)]
    #[case(Filter::new().eq("missing", Value::Null), false)]
    fn filters_match_top_level_equality(#[case] filter: Filter, #[case] expected: bool) {
        let document = doc(json!({ "id": "1", "owner": "alice", "score": 3 }));
        assert_eq!(filter.matches(&document), expected);
    }

    #[rstest]
    fn group_totals_default_missing_sums_to_zero() {
        let totals = GroupTotals {
            key: json!("p1"),
            sums: BTreeMap::from([("up".to_owned(), 2)]),
        };
        assert_eq!(totals.sum("up"), 2);
        assert_eq!(totals.sum("down"), 0);
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        id: String,
        title: String,
    }

    #[rstest]
    fn typed_records_convert_through_documents() {
        let sample = Sample {
            id: "s1".to_owned(),
            title: "hello".to_owned(),
        };
        let document = to_document(&sample).expect("encodes");
        assert_eq!(document_id(&document).expect("id present"), "s1");
        let decoded: Sample = from_document(document).expect("decodes");
        assert_eq!(decoded, sample);
    }

    #[rstest]
    fn non_object_values_are_rejected() {
        let err = to_document(&42).expect_err("scalars are not documents");
        assert!(matches!(err, DocumentStoreError::InvalidDocument { .. }));
    }

    #[rstest]
    fn collection_names_are_stable() {
        assert_eq!(Collection::PostVotes.as_str(), "post_votes");
        assert_eq!(Collection::CommentVotes.to_string(), "comment_votes");
    }
}
