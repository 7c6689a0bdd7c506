//! Vote ledger: one record per (subject, voter), last vote wins.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::debug;

use crate::domain::Username;
use crate::domain::ports::{
    Document, DocumentStore, DocumentStoreError, Filter, from_document, to_document,
};

use super::{SubjectRef, VALUE_FIELD, VoteRecord, VoteTransition, VoteValue};

/// Upserts vote records keyed by [`VoteRecord::ledger_key`].
///
/// Recording a vote never touches the subject's counts; callers run the
/// aggregator afterwards.
pub struct VoteLedger<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for VoteLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S> VoteLedger<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S> VoteLedger<S>
where
    S: DocumentStore,
{
    /// Insert the voter's record or overwrite its value in place.
    pub async fn record_vote(
        &self,
        subject: SubjectRef,
        voter: &Username,
        value: VoteValue,
    ) -> Result<VoteTransition, DocumentStoreError> {
        let collection = subject.kind.ledger_collection();
        let key = VoteRecord::ledger_key(&subject.id, voter);
        let filter = Filter::by_id(key.clone());

        if let Some(existing) = self.store.find(collection, &filter).await? {
            let previous: VoteRecord = from_document(existing)?;
            self.overwrite(subject, &filter, value).await?;
            debug!(%subject, voter = voter.as_ref(), "vote overwritten");
            return Ok(VoteTransition {
                previous: Some(previous.value),
                current: value,
            });
        }

        let record = VoteRecord {
            id: key,
            subject_id: subject.id,
            voter: voter.clone(),
            value,
            cast_at: self.clock.utc(),
        };
        match self.store.insert(collection, to_document(&record)?).await {
            Ok(()) => {
                debug!(%subject, voter = voter.as_ref(), "vote recorded");
                Ok(VoteTransition {
                    previous: None,
                    current: value,
                })
            }
            // A concurrent first vote by the same voter won the insert.
            Err(DocumentStoreError::DuplicateKey { .. }) => {
                self.overwrite(subject, &filter, value).await?;
                Ok(VoteTransition {
                    previous: None,
                    current: value,
                })
            }
            Err(err) => Err(err),
        }
    }

    async fn overwrite(
        &self,
        subject: SubjectRef,
        filter: &Filter,
        value: VoteValue,
    ) -> Result<(), DocumentStoreError> {
        let mut fields = Document::new();
        fields.insert(VALUE_FIELD.to_owned(), json!(value.as_i64()));
        fields.insert("cast_at".to_owned(), json!(self.clock.utc()));
        let matched = self
            .store
            .update_fields(subject.kind.ledger_collection(), filter, fields)
            .await?;
        if matched == 0 {
            return Err(DocumentStoreError::query(format!(
                "vote record for {subject} vanished during overwrite"
            )));
        }
        Ok(())
    }
}
