//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::domain::Username;
use crate::domain::ports::{
    MockAccountCommand, MockCommentCommand, MockCommentQuery, MockCommunityCommand,
    MockCommunityQuery, MockPostCommand, MockPostQuery, MockProfileCommand, MockProfileQuery,
    MockTokenService, MockVoteCommand,
};

use super::state::HttpState;

/// Mocked ports for handler tests. Unconfigured mocks panic when called.
#[derive(Default)]
pub struct StatePorts {
    pub accounts: MockAccountCommand,
    pub profiles: MockProfileQuery,
    pub profile_edits: MockProfileCommand,
    pub communities: MockCommunityCommand,
    pub communities_query: MockCommunityQuery,
    pub posts: MockPostCommand,
    pub posts_query: MockPostQuery,
    pub comments: MockCommentCommand,
    pub comments_query: MockCommentQuery,
    pub votes: MockVoteCommand,
    pub tokens: MockTokenService,
}

impl StatePorts {
    pub fn into_state(self) -> HttpState {
        HttpState {
            accounts: Arc::new(self.accounts),
            profiles: Arc::new(self.profiles),
            profile_edits: Arc::new(self.profile_edits),
            communities: Arc::new(self.communities),
            communities_query: Arc::new(self.communities_query),
            posts: Arc::new(self.posts),
            posts_query: Arc::new(self.posts_query),
            comments: Arc::new(self.comments),
            comments_query: Arc::new(self.comments_query),
            votes: Arc::new(self.votes),
            tokens: Arc::new(self.tokens),
        }
    }

    /// Build an app under `/api/v1` with the configured services registered.
    pub fn app<F>(
        self,
        configure: F,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    >
    where
        F: FnOnce(&mut web::ServiceConfig) + 'static,
    {
        App::new()
            .app_data(web::Data::new(self.into_state()))
            .service(web::scope("/api/v1").configure(configure))
    }
}

/// Accept `token` as proof of `username` any number of times, with the
/// account reported live.
pub fn expect_token(ports: &mut StatePorts, token: &'static str, username: &str) {
    let identity = Username::new(username).expect("fixture username");
    let live = identity.clone();
    ports
        .tokens
        .expect_verify()
        .withf(move |candidate| candidate == token)
        .returning(move |_| Ok(identity.clone()));
    ports
        .accounts
        .expect_ensure_active()
        .withf(move |candidate| candidate.to_string() == live.to_string())
        .returning(|_| Ok(()));
}
