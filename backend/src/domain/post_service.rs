//! Post service implementing the post driving ports.
//!
//! Vote counts on a post are owned by the vote workflow; this service never
//! writes them after creation.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ownership::ensure_owner;
use crate::domain::ports::{
    Collection, CreatePostRequest, Document, DocumentStore, Filter, PostCommand, PostQuery,
    UpdatePostRequest, from_document, to_document,
};
use crate::domain::store_errors::map_store_error;
use crate::domain::{CommunityName, Error, Post, Username};

/// Field linking a comment to its post.
pub(crate) const POST_ID_FIELD: &str = "post_id";

/// Post service backed by the document store.
pub struct PostService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> PostService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S> PostService<S>
where
    S: DocumentStore,
{
    async fn load(&self, id: Uuid) -> Result<Post, Error> {
        load_post(self.store.as_ref(), id).await
    }

    async fn ensure_community_exists(&self, community: &CommunityName) -> Result<(), Error> {
        let found = self
            .store
            .find(Collection::Communities, &Filter::by_id(community.as_ref()))
            .await
            .map_err(map_store_error)?;
        if found.is_none() {
            return Err(Error::not_found(format!("community {community} not found"))
                .with_details(json!({ "resource": "community", "id": community.as_ref() })));
        }
        Ok(())
    }
}

/// Load a post or report `not_found`.
pub(crate) async fn load_post<S>(store: &S, id: Uuid) -> Result<Post, Error>
where
    S: DocumentStore + ?Sized,
{
    let document = store
        .find(Collection::Posts, &Filter::by_id(id.to_string()))
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| {
            Error::not_found("post not found").with_details(json!({ "resource": "post", "id": id }))
        })?;
    from_document(document).map_err(map_store_error)
}

#[async_trait]
impl<S> PostCommand for PostService<S>
where
    S: DocumentStore,
{
    async fn create_post(&self, request: CreatePostRequest) -> Result<Post, Error> {
        self.ensure_community_exists(&request.community).await?;

        let now = self.clock.utc();
        let post = Post {
            id: Uuid::new_v4(),
            title: request.title,
            body: request.body,
            community: request.community,
            owner: request.owner,
            up_count: 0,
            down_count: 0,
            comments_count: 0,
            created_at: now,
            updated_at: now,
        };
        let document = to_document(&post).map_err(map_store_error)?;
        self.store
            .insert(Collection::Posts, document)
            .await
            .map_err(map_store_error)?;
        debug!(post_id = %post.id, community = post.community.as_ref(), "post created");
        Ok(post)
    }

    async fn update_post(&self, request: UpdatePostRequest) -> Result<Post, Error> {
        let mut post = self.load(request.id).await?;
        ensure_owner(&post, &request.caller)?;

        let mut fields = Document::new();
        if let Some(title) = request.title {
            fields.insert("title".to_owned(), json!(title));
            post.title = title;
        }
        if let Some(body) = request.body {
            fields.insert("body".to_owned(), json!(body));
            post.body = body;
        }
        post.updated_at = self.clock.utc();
        fields.insert("updated_at".to_owned(), json!(post.updated_at));

        let matched = self
            .store
            .update_fields(Collection::Posts, &Filter::by_id(post.id.to_string()), fields)
            .await
            .map_err(map_store_error)?;
        if matched == 0 {
            return Err(Error::not_found("post not found"));
        }
        debug!(post_id = %post.id, "post updated");
        Ok(post)
    }

    async fn delete_post(&self, id: Uuid, caller: &Username) -> Result<(), Error> {
        let post = self.load(id).await?;
        ensure_owner(&post, caller)?;

        let comments = self
            .store
            .delete(Collection::Comments, &Filter::new().eq(POST_ID_FIELD, id.to_string()))
            .await
            .map_err(map_store_error)?;
        self.store
            .delete(Collection::Posts, &Filter::by_id(id.to_string()))
            .await
            .map_err(map_store_error)?;
        debug!(post_id = %id, comments, "post deleted");
        Ok(())
    }
}

#[async_trait]
impl<S> PostQuery for PostService<S>
where
    S: DocumentStore,
{
    async fn list_posts(&self, community: Option<CommunityName>) -> Result<Vec<Post>, Error> {
        let filter = match community {
            Some(name) => Filter::new().eq("community", name.as_ref()),
            None => Filter::new(),
        };
        let documents = self
            .store
            .find_many(Collection::Posts, &filter)
            .await
            .map_err(map_store_error)?;
        let mut posts = documents
            .into_iter()
            .map(from_document::<Post>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_store_error)?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(posts)
    }

    async fn get_post(&self, id: Uuid) -> Result<Post, Error> {
        self.load(id).await
    }
}

#[cfg(test)]
#[path = "post_service_tests.rs"]
mod tests;
