//! Comment service implementing the comment driving ports.
//!
//! Creating or deleting a comment recomputes the parent post's
//! `comments_count` from the comments collection rather than incrementing it.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ownership::ensure_owner;
use crate::domain::post_service::{POST_ID_FIELD, load_post};
use crate::domain::ports::{
    Collection, CommentCommand, CommentQuery, CreateCommentRequest, Document, DocumentStore,
    Filter, UpdateCommentRequest, from_document, to_document,
};
use crate::domain::store_errors::map_store_error;
use crate::domain::{Comment, Error, Username};

/// Comment service backed by the document store.
pub struct CommentService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> CommentService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S> CommentService<S>
where
    S: DocumentStore,
{
    async fn load(&self, id: Uuid) -> Result<Comment, Error> {
        let document = self
            .store
            .find(Collection::Comments, &Filter::by_id(id.to_string()))
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| {
                Error::not_found("comment not found")
                    .with_details(json!({ "resource": "comment", "id": id }))
            })?;
        from_document(document).map_err(map_store_error)
    }

    async fn refresh_comments_count(&self, post_id: Uuid) -> Result<u64, Error> {
        let count = self
            .store
            .count(
                Collection::Comments,
                &Filter::new().eq(POST_ID_FIELD, post_id.to_string()),
            )
            .await
            .map_err(map_store_error)?;
        let mut fields = Document::new();
        fields.insert("comments_count".to_owned(), json!(count));
        self.store
            .update_fields(Collection::Posts, &Filter::by_id(post_id.to_string()), fields)
            .await
            .map_err(map_store_error)?;
        Ok(count)
    }
}

#[async_trait]
impl<S> CommentCommand for CommentService<S>
where
    S: DocumentStore,
{
    async fn create_comment(&self, request: CreateCommentRequest) -> Result<Comment, Error> {
        load_post(self.store.as_ref(), request.post_id).await?;

        let now = self.clock.utc();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: request.post_id,
            body: request.body,
            owner: request.owner,
            up_count: 0,
            down_count: 0,
            edited: false,
            created_at: now,
            updated_at: now,
        };
        let document = to_document(&comment).map_err(map_store_error)?;
        self.store
            .insert(Collection::Comments, document)
            .await
            .map_err(map_store_error)?;
        let count = self.refresh_comments_count(comment.post_id).await?;
        debug!(comment_id = %comment.id, post_id = %comment.post_id, count, "comment created");
        Ok(comment)
    }

    async fn update_comment(&self, request: UpdateCommentRequest) -> Result<Comment, Error> {
        let mut comment = self.load(request.id).await?;
        ensure_owner(&comment, &request.caller)?;

        comment.body = request.body;
        comment.edited = true;
        comment.updated_at = self.clock.utc();

        let mut fields = Document::new();
        fields.insert("body".to_owned(), json!(comment.body));
        fields.insert("edited".to_owned(), json!(true));
        fields.insert("updated_at".to_owned(), json!(comment.updated_at));
        let matched = self
            .store
            .update_fields(
                Collection::Comments,
                &Filter::by_id(comment.id.to_string()),
                fields,
            )
            .await
            .map_err(map_store_error)?;
        if matched == 0 {
            return Err(Error::not_found("comment not found"));
        }
        Ok(comment)
    }

    async fn delete_comment(&self, id: Uuid, caller: &Username) -> Result<(), Error> {
        let comment = self.load(id).await?;
        ensure_owner(&comment, caller)?;

        self.store
            .delete(Collection::Comments, &Filter::by_id(id.to_string()))
            .await
            .map_err(map_store_error)?;
        let count = self.refresh_comments_count(comment.post_id).await?;
        debug!(comment_id = %id, post_id = %comment.post_id, count, "comment deleted");
        Ok(())
    }
}

#[async_trait]
impl<S> CommentQuery for CommentService<S>
where
    S: DocumentStore,
{
    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, Error> {
        load_post(self.store.as_ref(), post_id).await?;
        let documents = self
            .store
            .find_many(
                Collection::Comments,
                &Filter::new().eq(POST_ID_FIELD, post_id.to_string()),
            )
            .await
            .map_err(map_store_error)?;
        let mut comments = documents
            .into_iter()
            .map(from_document::<Comment>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_store_error)?;
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }
}
