//! Vote aggregator: full recomputation of a subject's tally from its ledger.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::ports::{ConditionalSum, DocumentStore, DocumentStoreError, Filter, GroupByQuery};

use super::{SUBJECT_FIELD, SubjectRef, VALUE_FIELD, VoteTally, VoteValue};

const UP_SUM: &str = "up";
const DOWN_SUM: &str = "down";

/// Counts up and down votes for a subject.
///
/// Every call scans the subject's whole ledger; nothing is incremental.
pub struct VoteAggregator<S> {
    store: Arc<S>,
}

impl<S> Clone for VoteAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> VoteAggregator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> VoteAggregator<S>
where
    S: DocumentStore,
{
    /// Current tally; `(0, 0)` when the subject has no ledger entries.
    pub async fn aggregate(&self, subject: SubjectRef) -> Result<VoteTally, DocumentStoreError> {
        let subject_id = subject.id.to_string();
        let query = GroupByQuery {
            filter: Filter::new().eq(SUBJECT_FIELD, subject_id.clone()),
            group_key: SUBJECT_FIELD.to_owned(),
            sums: vec![
                ConditionalSum::new(UP_SUM, VALUE_FIELD, VoteValue::Up.as_i64()),
                ConditionalSum::new(DOWN_SUM, VALUE_FIELD, VoteValue::Down.as_i64()),
            ],
        };
        let groups = self
            .store
            .aggregate_group_by(subject.kind.ledger_collection(), &query)
            .await?;

        let key = Value::String(subject_id);
        Ok(groups
            .into_iter()
            .find(|group| group.key == key)
            .map(|group| VoteTally::new(group.sum(UP_SUM), group.sum(DOWN_SUM)))
            .unwrap_or_default())
    }
}
