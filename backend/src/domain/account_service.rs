//! Account service: sign-up, login and account removal.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::domain::ownership::ensure_owner;
use crate::domain::ports::{
    AccountCommand, Collection, Document, DocumentStore, DocumentStoreError, Filter, LoginSession,
    PasswordHasher, PasswordHasherError, TokenService, TokenServiceError, from_document,
    to_document,
};
use crate::domain::store_errors::map_store_error;
use crate::domain::{
    Error, LoginCredentials, Profile, PublicAccount, SignupDetails, UserAccount, Username,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";
const ACCOUNT_GONE: &str = "account no longer exists";
/// Hashed once and verified against when no live account matches a login.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Account service wiring the store with the hashing and token ports.
pub struct AccountService<S> {
    store: Arc<S>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    clock: Arc<dyn Clock>,
    decoy_hash: OnceCell<String>,
}

impl<S> AccountService<S> {
    pub fn new(
        store: Arc<S>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            clock,
            decoy_hash: OnceCell::new(),
        }
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(format!("password hashing failed: {error}"))
}

fn map_token_error(error: TokenServiceError) -> Error {
    Error::internal(format!("token issuance failed: {error}"))
}

impl<S> AccountService<S>
where
    S: DocumentStore,
{
    async fn find_account(&self, username: &Username) -> Result<Option<UserAccount>, Error> {
        self.store
            .find(Collection::Users, &Filter::by_id(username.as_ref()))
            .await
            .map_err(map_store_error)?
            .map(from_document::<UserAccount>)
            .transpose()
            .map_err(map_store_error)
    }

    async fn find_active_account(&self, username: &Username) -> Result<Option<UserAccount>, Error> {
        Ok(self
            .find_account(username)
            .await?
            .filter(UserAccount::is_active))
    }

    /// Spend the same hashing work as a real check so unknown usernames are
    /// not distinguishable by response time.
    async fn verify_decoy(&self, password: &str) -> Result<(), Error> {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hasher.hash(DECOY_PASSWORD))
            .await
            .map_err(map_hasher_error)?;
        self.hasher
            .verify(password, decoy)
            .await
            .map(|_| ())
            .map_err(map_hasher_error)
    }

    async fn create_profile(&self, profile: &Profile) -> Result<(), Error> {
        let document = to_document(profile).map_err(map_store_error)?;
        match self.store.insert(Collection::Profiles, document).await {
            Ok(()) => Ok(()),
            // A profile left behind by an interrupted account deletion is reset.
            Err(DocumentStoreError::DuplicateKey { .. }) => {
                let mut fields = Document::new();
                fields.insert("bio".to_owned(), json!(profile.bio));
                fields.insert("cake_day".to_owned(), json!(profile.cake_day));
                self.store
                    .update_fields(
                        Collection::Profiles,
                        &Filter::by_id(profile.username.as_ref()),
                        fields,
                    )
                    .await
                    .map(|_| ())
                    .map_err(map_store_error)
            }
            Err(err) => Err(map_store_error(err)),
        }
    }
}

#[async_trait]
impl<S> AccountCommand for AccountService<S>
where
    S: DocumentStore,
{
    async fn sign_up(&self, details: SignupDetails) -> Result<PublicAccount, Error> {
        let password_hash = self
            .hasher
            .hash(details.password())
            .await
            .map_err(map_hasher_error)?;
        let now = self.clock.utc();
        let account = UserAccount {
            username: details.username().clone(),
            email: details.email().clone(),
            password_hash,
            created_at: now,
            deleted_at: None,
        };
        let document = to_document(&account).map_err(map_store_error)?;
        match self.store.insert(Collection::Users, document).await {
            Ok(()) => {}
            Err(DocumentStoreError::DuplicateKey { .. }) => {
                return Err(Error::conflict("username is already taken")
                    .with_details(json!({ "field": "username", "code": "username_taken" })));
            }
            Err(err) => return Err(map_store_error(err)),
        }

        self.create_profile(&Profile {
            username: account.username.clone(),
            bio: String::new(),
            cake_day: now,
        })
        .await?;
        info!(username = account.username.as_ref(), "account created");
        Ok(account.public_view())
    }

    async fn log_in(&self, credentials: LoginCredentials) -> Result<LoginSession, Error> {
        let Ok(username) = Username::new(credentials.username()) else {
            self.verify_decoy(credentials.password()).await?;
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let Some(account) = self.find_active_account(&username).await? else {
            debug!(username = username.as_ref(), "login for unknown account");
            self.verify_decoy(credentials.password()).await?;
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .await
            .map_err(map_hasher_error)?;
        if !matches {
            debug!(username = username.as_ref(), "login with wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        let token = self
            .tokens
            .issue(&account.username)
            .await
            .map_err(map_token_error)?;
        Ok(LoginSession {
            username: account.username,
            token,
        })
    }

    async fn delete_account(&self, username: &Username, caller: &Username) -> Result<(), Error> {
        let account = self.find_active_account(username).await?.ok_or_else(|| {
            Error::not_found(format!("account {username} not found"))
                .with_details(json!({ "resource": "account", "id": username.as_ref() }))
        })?;
        ensure_owner(&account, caller)?;

        let mut tombstone = Document::new();
        tombstone.insert("deleted_at".to_owned(), json!(self.clock.utc()));
        tombstone.insert("password_hash".to_owned(), json!(""));
        self.store
            .update_fields(Collection::Users, &Filter::by_id(username.as_ref()), tombstone)
            .await
            .map_err(map_store_error)?;
        self.store
            .delete(Collection::Profiles, &Filter::by_id(username.as_ref()))
            .await
            .map_err(map_store_error)?;
        info!(username = username.as_ref(), "account deleted");
        Ok(())
    }

    async fn ensure_active(&self, username: &Username) -> Result<(), Error> {
        match self.find_active_account(username).await? {
            Some(_) => Ok(()),
            None => {
                debug!(username = username.as_ref(), "token names a deleted account");
                Err(Error::unauthorized(ACCOUNT_GONE))
            }
        }
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
