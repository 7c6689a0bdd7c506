//! Vote workflow: subject check, ledger upsert, aggregation, write-back.
//!
//! The steps run sequentially against the store with no transaction around
//! them. A failure or timeout after the ledger write leaves the new vote in
//! place with stale counts on the subject; the next vote on the subject
//! recomputes them. Two concurrent votes on one subject can race between
//! aggregation and write-back, in which case the last writer's snapshot wins.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::ownership::{ResourceKind, ensure_identity};
use crate::domain::ports::{CastVoteRequest, Document, DocumentStore, Filter, VoteCommand};
use crate::domain::store_errors::map_store_error;
use crate::domain::{Error, SubjectRef, VoteTally};

use super::{
    AggregationFailurePolicy, DOWN_COUNT_FIELD, UP_COUNT_FIELD, VoteAggregator, VoteLedger,
};

/// Vote service implementing [`VoteCommand`].
pub struct VoteService<S> {
    store: Arc<S>,
    ledger: VoteLedger<S>,
    aggregator: VoteAggregator<S>,
    failure_policy: AggregationFailurePolicy,
}

impl<S> Clone for VoteService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ledger: self.ledger.clone(),
            aggregator: self.aggregator.clone(),
            failure_policy: self.failure_policy,
        }
    }
}

impl<S> VoteService<S> {
    /// Create a service that propagates aggregation failures.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger: VoteLedger::new(Arc::clone(&store), clock),
            aggregator: VoteAggregator::new(Arc::clone(&store)),
            store,
            failure_policy: AggregationFailurePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_failure_policy(mut self, policy: AggregationFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

impl<S> VoteService<S>
where
    S: DocumentStore,
{
    async fn ensure_subject_exists(&self, subject: SubjectRef) -> Result<(), Error> {
        let found = self
            .store
            .find(
                subject.kind.subject_collection(),
                &Filter::by_id(subject.id.to_string()),
            )
            .await
            .map_err(map_store_error)?;
        match found {
            Some(_) => Ok(()),
            None => Err(Self::subject_not_found(subject)),
        }
    }

    async fn write_back(&self, subject: SubjectRef, tally: VoteTally) -> Result<(), Error> {
        let mut fields = Document::new();
        fields.insert(UP_COUNT_FIELD.to_owned(), json!(tally.up_count));
        fields.insert(DOWN_COUNT_FIELD.to_owned(), json!(tally.down_count));
        let matched = self
            .store
            .update_fields(
                subject.kind.subject_collection(),
                &Filter::by_id(subject.id.to_string()),
                fields,
            )
            .await
            .map_err(map_store_error)?;
        if matched == 0 {
            return Err(Self::subject_not_found(subject));
        }
        Ok(())
    }

    fn subject_not_found(subject: SubjectRef) -> Error {
        Error::not_found(format!("{} not found", subject.kind.as_str())).with_details(json!({
            "resource": subject.kind.as_str(),
            "id": subject.id,
        }))
    }
}

#[async_trait]
impl<S> VoteCommand for VoteService<S>
where
    S: DocumentStore,
{
    async fn cast_vote(&self, request: CastVoteRequest) -> Result<VoteTally, Error> {
        let CastVoteRequest {
            subject,
            voter,
            claimed_voter,
            value,
        } = request;

        if let Some(claimed) = claimed_voter.as_ref() {
            ensure_identity(ResourceKind::Vote, claimed, &voter)?;
        }
        self.ensure_subject_exists(subject).await?;

        let transition = self
            .ledger
            .record_vote(subject, &voter, value)
            .await
            .map_err(map_store_error)?;
        debug!(%subject, ?transition, "ledger updated");

        let tally = match self.aggregator.aggregate(subject).await {
            Ok(tally) => tally,
            Err(err) => match self.failure_policy {
                AggregationFailurePolicy::Propagate => return Err(map_store_error(err)),
                AggregationFailurePolicy::FailOpen => {
                    warn!(%subject, error = %err, "vote aggregation failed; reporting neutral counts");
                    return Ok(VoteTally::default());
                }
            },
        };

        self.write_back(subject, tally).await?;
        debug!(%subject, up = tally.up_count, down = tally.down_count, "vote counts written back");
        Ok(tally)
    }
}
