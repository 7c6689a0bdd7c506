//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, CommentCommand, CommentQuery, CommunityCommand, CommunityQuery, PostCommand,
    PostQuery, ProfileCommand, ProfileQuery, TokenService, VoteCommand,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use forum_backend::domain::{
///     AccountService, CommentService, CommunityService, PostService, ProfileService,
///     VoteService,
/// };
/// use forum_backend::inbound::http::state::HttpState;
/// use forum_backend::outbound::memory_store::MemoryDocumentStore;
/// use forum_backend::outbound::password::Argon2PasswordHasher;
/// use forum_backend::outbound::token::JwtTokenService;
/// use mockable::DefaultClock;
/// use zeroize::Zeroizing;
///
/// let store = Arc::new(MemoryDocumentStore::new());
/// let clock = Arc::new(DefaultClock);
/// let tokens = Arc::new(
///     JwtTokenService::new(
///         Zeroizing::new(vec![7; 32]),
///         chrono::Duration::hours(24),
///         clock.clone(),
///     )
///     .expect("strong secret"),
/// );
/// let accounts = Arc::new(AccountService::new(
///     store.clone(),
///     Arc::new(Argon2PasswordHasher::new()),
///     tokens.clone(),
///     clock.clone(),
/// ));
/// let profiles = Arc::new(ProfileService::new(store.clone()));
/// let communities = Arc::new(CommunityService::new(store.clone(), clock.clone()));
/// let posts = Arc::new(PostService::new(store.clone(), clock.clone()));
/// let comments = Arc::new(CommentService::new(store.clone(), clock.clone()));
/// let state = HttpState {
///     accounts,
///     profiles: profiles.clone(),
///     profile_edits: profiles,
///     communities: communities.clone(),
///     communities_query: communities,
///     posts: posts.clone(),
///     posts_query: posts,
///     comments: comments.clone(),
///     comments_query: comments,
///     votes: Arc::new(VoteService::new(store, clock)),
///     tokens,
/// };
/// let _votes = state.votes.clone();
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub profiles: Arc<dyn ProfileQuery>,
    pub profile_edits: Arc<dyn ProfileCommand>,
    pub communities: Arc<dyn CommunityCommand>,
    pub communities_query: Arc<dyn CommunityQuery>,
    pub posts: Arc<dyn PostCommand>,
    pub posts_query: Arc<dyn PostQuery>,
    pub comments: Arc<dyn CommentCommand>,
    pub comments_query: Arc<dyn CommentQuery>,
    pub votes: Arc<dyn VoteCommand>,
    /// Verifies bearer tokens for [`super::auth::AuthenticatedUser`].
    pub tokens: Arc<dyn TokenService>,
}
