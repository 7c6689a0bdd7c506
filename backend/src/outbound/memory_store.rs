//! In-process document store.
//!
//! Used when no database URL is configured and by HTTP integration tests.
//! Filter semantics match the PostgreSQL adapter: top-level field equality.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::ports::{
    Collection, Document, DocumentStore, DocumentStoreError, Filter, GroupByQuery, GroupTotals,
    ID_FIELD, document_id,
};

/// Document store keeping every collection in memory.
///
/// Documents within a collection are ordered by id, so `find` returns the
/// lowest matching id.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, BTreeMap<String, Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn reject_id_rewrite(fields: &Document) -> Result<(), DocumentStoreError> {
    if fields.contains_key(ID_FIELD) {
        return Err(DocumentStoreError::invalid_document(
            "document ids cannot be updated",
        ));
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let guard = self.collections.read().await;
        Ok(guard.get(&collection).and_then(|documents| {
            documents
                .values()
                .find(|document| filter.matches(document))
                .cloned()
        }))
    }

    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .map(|documents| {
                documents
                    .values()
                    .filter(|document| filter.matches(document))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<(), DocumentStoreError> {
        let id = document_id(&document)?.to_owned();
        let mut guard = self.collections.write().await;
        let documents = guard.entry(collection).or_default();
        if documents.contains_key(&id) {
            return Err(DocumentStoreError::duplicate_key(collection.as_str(), id));
        }
        documents.insert(id, document);
        Ok(())
    }

    async fn update_fields(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Document,
    ) -> Result<u64, DocumentStoreError> {
        reject_id_rewrite(&fields)?;
        let mut guard = self.collections.write().await;
        let Some(documents) = guard.get_mut(&collection) else {
            return Ok(0);
        };
        let mut matched = 0;
        for document in documents.values_mut().filter(|doc| filter.matches(doc)) {
            for (key, value) in &fields {
                document.insert(key.clone(), value.clone());
            }
            matched += 1;
        }
        Ok(matched)
    }

    async fn delete(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, DocumentStoreError> {
        let mut guard = self.collections.write().await;
        let Some(documents) = guard.get_mut(&collection) else {
            return Ok(0);
        };
        let before = documents.len();
        documents.retain(|_, document| !filter.matches(document));
        Ok(u64::try_from(before - documents.len()).unwrap_or(u64::MAX))
    }

    async fn count(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, DocumentStoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .map(|documents| documents.values().filter(|doc| filter.matches(doc)).count())
            .map_or(0, |count| u64::try_from(count).unwrap_or(u64::MAX)))
    }

    async fn aggregate_group_by(
        &self,
        collection: Collection,
        query: &GroupByQuery,
    ) -> Result<Vec<GroupTotals>, DocumentStoreError> {
        let guard = self.collections.read().await;
        let Some(documents) = guard.get(&collection) else {
            return Ok(Vec::new());
        };

        let mut groups: Vec<GroupTotals> = Vec::new();
        for document in documents.values().filter(|doc| query.filter.matches(doc)) {
            let key = document
                .get(&query.group_key)
                .cloned()
                .unwrap_or(Value::Null);
            let group = match groups.iter().position(|group| group.key == key) {
                Some(index) => groups.get_mut(index),
                None => {
                    groups.push(GroupTotals {
                        key,
                        sums: query
                            .sums
                            .iter()
                            .map(|sum| (sum.name.clone(), 0))
                            .collect(),
                    });
                    groups.last_mut()
                }
            };
            let Some(group) = group else {
                continue;
            };
            for sum in &query.sums {
                if document.get(&sum.field) == Some(&sum.equals) {
                    *group.sums.entry(sum.name.clone()).or_insert(0) += 1;
                }
            }
        }
        Ok(groups)
    }
}
