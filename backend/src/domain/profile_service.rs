//! Profile service implementing the profile driving ports.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::ownership::ensure_owner;
use crate::domain::ports::{
    Collection, Document, DocumentStore, Filter, ProfileCommand, ProfileQuery, UpdateBioRequest,
    from_document,
};
use crate::domain::store_errors::map_store_error;
use crate::domain::{Error, Profile, ProfileView, Username};

const OWNER_FIELD: &str = "owner";

/// Profile service backed by the document store.
pub struct ProfileService<S> {
    store: Arc<S>,
}

impl<S> ProfileService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> ProfileService<S>
where
    S: DocumentStore,
{
    async fn load(&self, username: &Username) -> Result<Profile, Error> {
        let document = self
            .store
            .find(Collection::Profiles, &Filter::by_id(username.as_ref()))
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| {
                Error::not_found(format!("profile {username} not found"))
                    .with_details(json!({ "resource": "profile", "id": username.as_ref() }))
            })?;
        from_document(document).map_err(map_store_error)
    }

    async fn view(&self, profile: Profile) -> Result<ProfileView, Error> {
        let by_owner = Filter::new().eq(OWNER_FIELD, profile.username.as_ref());
        let post_count = self
            .store
            .count(Collection::Posts, &by_owner)
            .await
            .map_err(map_store_error)?;
        let comment_count = self
            .store
            .count(Collection::Comments, &by_owner)
            .await
            .map_err(map_store_error)?;
        Ok(ProfileView {
            profile,
            post_count,
            comment_count,
        })
    }
}

#[async_trait]
impl<S> ProfileQuery for ProfileService<S>
where
    S: DocumentStore,
{
    async fn get_profile(&self, username: &Username) -> Result<ProfileView, Error> {
        let profile = self.load(username).await?;
        self.view(profile).await
    }
}

#[async_trait]
impl<S> ProfileCommand for ProfileService<S>
where
    S: DocumentStore,
{
    async fn update_bio(&self, request: UpdateBioRequest) -> Result<ProfileView, Error> {
        let mut profile = self.load(&request.username).await?;
        ensure_owner(&profile, &request.caller)?;

        let mut fields = Document::new();
        fields.insert("bio".to_owned(), json!(request.bio));
        self.store
            .update_fields(
                Collection::Profiles,
                &Filter::by_id(profile.username.as_ref()),
                fields,
            )
            .await
            .map_err(map_store_error)?;
        profile.bio = request.bio;
        self.view(profile).await
    }
}
