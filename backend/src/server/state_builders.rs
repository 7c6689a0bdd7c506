//! Builders wiring domain services over a document store into [`HttpState`].

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{DocumentStore, PasswordHasher, TokenService};
use crate::domain::{
    AccountService, AggregationFailurePolicy, CommentService, CommunityService, PostService,
    ProfileService, VoteService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory_store::MemoryDocumentStore;
use crate::outbound::password::Argon2PasswordHasher;
use crate::outbound::persistence::DieselDocumentStore;

use super::ServerConfig;

/// Collaborators shared by every service regardless of the store.
#[derive(Clone)]
pub struct ServiceDependencies {
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub clock: Arc<dyn Clock>,
    pub failure_policy: AggregationFailurePolicy,
}

/// Build the HTTP state with every port served by `store`.
pub fn build_http_state_over<S>(store: Arc<S>, deps: ServiceDependencies) -> HttpState
where
    S: DocumentStore + 'static,
{
    let ServiceDependencies {
        hasher,
        tokens,
        clock,
        failure_policy,
    } = deps;
    let profiles = Arc::new(ProfileService::new(store.clone()));
    let communities = Arc::new(CommunityService::new(store.clone(), clock.clone()));
    let posts = Arc::new(PostService::new(store.clone(), clock.clone()));
    let comments = Arc::new(CommentService::new(store.clone(), clock.clone()));
    let votes = VoteService::new(store.clone(), clock.clone()).with_failure_policy(failure_policy);
    HttpState {
        accounts: Arc::new(AccountService::new(store, hasher, tokens.clone(), clock)),
        profiles: profiles.clone(),
        profile_edits: profiles,
        communities: communities.clone(),
        communities_query: communities,
        posts: posts.clone(),
        posts_query: posts,
        comments: comments.clone(),
        comments_query: comments,
        votes: Arc::new(votes),
        tokens,
    }
}

/// Pick the store from the configuration: PostgreSQL when a pool is
/// attached, otherwise an in-memory store private to this process.
pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    let deps = ServiceDependencies {
        hasher: Arc::new(Argon2PasswordHasher::new()),
        tokens: config.tokens.clone(),
        clock: config.clock.clone(),
        failure_policy: config.failure_policy,
    };
    match &config.db_pool {
        Some(pool) => {
            build_http_state_over(Arc::new(DieselDocumentStore::new(pool.clone())), deps)
        }
        None => build_http_state_over(Arc::new(MemoryDocumentStore::new()), deps),
    }
}
