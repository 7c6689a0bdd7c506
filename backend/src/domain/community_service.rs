//! Community service implementing the community driving ports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::debug;

use crate::domain::ownership::ensure_owner;
use crate::domain::ports::{
    Collection, CommunityCommand, CommunityQuery, CreateCommunityRequest, DocumentStore,
    DocumentStoreError, Filter, from_document, to_document,
};
use crate::domain::store_errors::map_store_error;
use crate::domain::{Community, CommunityName, Error, Username};

/// Community service backed by the document store.
pub struct CommunityService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> CommunityService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S> CommunityService<S>
where
    S: DocumentStore,
{
    async fn load(&self, name: &CommunityName) -> Result<Community, Error> {
        let document = self
            .store
            .find(Collection::Communities, &Filter::by_id(name.as_ref()))
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| {
                Error::not_found(format!("community {name} not found"))
                    .with_details(json!({ "resource": "community", "id": name.as_ref() }))
            })?;
        from_document(document).map_err(map_store_error)
    }
}

#[async_trait]
impl<S> CommunityCommand for CommunityService<S>
where
    S: DocumentStore,
{
    async fn create_community(&self, request: CreateCommunityRequest) -> Result<Community, Error> {
        let community = Community {
            name: request.name,
            description: request.description,
            creator: request.creator,
            created_at: self.clock.utc(),
        };
        let document = to_document(&community).map_err(map_store_error)?;
        match self.store.insert(Collection::Communities, document).await {
            Ok(()) => {
                debug!(community = community.name.as_ref(), "community created");
                Ok(community)
            }
            Err(DocumentStoreError::DuplicateKey { .. }) => Err(Error::conflict(format!(
                "community {} already exists",
                community.name
            ))),
            Err(err) => Err(map_store_error(err)),
        }
    }

    async fn delete_community(
        &self,
        name: &CommunityName,
        caller: &Username,
    ) -> Result<(), Error> {
        let community = self.load(name).await?;
        ensure_owner(&community, caller)?;
        self.store
            .delete(Collection::Communities, &Filter::by_id(name.as_ref()))
            .await
            .map_err(map_store_error)?;
        debug!(community = name.as_ref(), "community deleted");
        Ok(())
    }
}

#[async_trait]
impl<S> CommunityQuery for CommunityService<S>
where
    S: DocumentStore,
{
    async fn list_communities(&self) -> Result<Vec<Community>, Error> {
        let documents = self
            .store
            .find_many(Collection::Communities, &Filter::new())
            .await
            .map_err(map_store_error)?;
        let mut communities = documents
            .into_iter()
            .map(from_document::<Community>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_store_error)?;
        communities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(communities)
    }

    async fn get_community(&self, name: &CommunityName) -> Result<Community, Error> {
        self.load(name).await
    }
}
