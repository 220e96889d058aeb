// User Directory - maps external identities to profile documents
// Profiles are created lazily on the first authenticated request and never deleted

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::DocId;
use crate::entities::{EntUser, SocialLinks, UserSummary};
use crate::error::{AppError, AppResult};
use crate::framework::{Entity, Record};
use crate::infrastructure::{
    Cache, DocIdGenerator, DocQuery, DocumentStore, Filter, Identity, IdentityProvider,
    ProfileAttributes,
};
use crate::schemas::{CreateUserRequest, UpdateProfileRequest, UserQuery};

#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    ids: Arc<DocIdGenerator>,
    // external id -> document id; the mapping never changes once created
    id_cache: Arc<Cache<String, DocId>>,
}

/// `user_` plus the last six characters of the external id
pub fn fallback_username(external_id: &str) -> String {
    let chars: Vec<char> = external_id.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(6)..].iter().collect();
    format!("user_{}", tail)
}

fn user_from_attributes(identity: &Identity, attributes: ProfileAttributes) -> EntUser {
    EntUser {
        external_id: identity.external_id.clone(),
        email: attributes.email.unwrap_or_default().to_lowercase(),
        username: attributes
            .username
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| fallback_username(&identity.external_id)),
        first_name: attributes.first_name.unwrap_or_default(),
        last_name: attributes.last_name.unwrap_or_default(),
        profile_image: attributes.image_url.unwrap_or_default(),
        bio: String::new(),
        location: String::new(),
        website: String::new(),
        social_links: SocialLinks::default(),
        followers: Vec::new(),
        following: Vec::new(),
    }
}

impl UserDirectory {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        ids: Arc<DocIdGenerator>,
        id_cache: Arc<Cache<String, DocId>>,
    ) -> Self {
        Self {
            store,
            identity,
            ids,
            id_cache,
        }
    }

    async fn lookup(&self, external_id: &str) -> AppResult<Option<Record<EntUser>>> {
        if let Some(id) = self.id_cache.get(&external_id.to_string()) {
            if let Some(record) = EntUser::gen_nullable(self.store.as_ref(), Some(id)).await? {
                return Ok(Some(record));
            }
        }

        let query = DocQuery::filtered(vec![Filter::eq("externalId", external_id)]).page(0, 1);
        let found = EntUser::gen_where(self.store.as_ref(), &query)
            .await?
            .into_iter()
            .next();
        if let Some(record) = &found {
            self.id_cache.insert(external_id.to_string(), record.id);
        }
        Ok(found)
    }

    /// Insert a new profile. A duplicate key is resolved by re-reading by
    /// external id: a concurrent `ensure` for the same identity wins the race
    /// and its record is returned with `created = false`.
    async fn insert_profile(
        &self,
        identity: &Identity,
        user: EntUser,
    ) -> AppResult<(Record<EntUser>, bool)> {
        let id = self.ids.next_id();
        if let Some(record) = EntUser::insert_new(self.store.as_ref(), id, user).await? {
            self.id_cache.insert(identity.external_id.clone(), record.id);
            tracing::info!(user_id = %record.id, external_id = %identity.external_id, "user profile created");
            return Ok((record, true));
        }

        match self.lookup(&identity.external_id).await? {
            Some(existing) => Ok((existing, false)),
            None => Err(AppError::Conflict(
                "Email or username is already in use".to_string(),
            )),
        }
    }

    /// Profile for a verified identity, created from the provider's attributes when absent
    pub async fn ensure(&self, identity: &Identity) -> AppResult<(Record<EntUser>, bool)> {
        if let Some(record) = self.lookup(&identity.external_id).await? {
            return Ok((record, false));
        }

        let attributes = self
            .identity
            .profile(&identity.external_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Identity provider has no user {}",
                    identity.external_id
                ))
            })?;

        self.insert_profile(identity, user_from_attributes(identity, attributes))
            .await
    }

    /// `ensure` without the created flag
    pub async fn current(&self, identity: &Identity) -> AppResult<Record<EntUser>> {
        Ok(self.ensure(identity).await?.0)
    }

    /// Existing profile only; `NotFound` when the identity has none yet
    pub async fn resolve(&self, identity: &Identity) -> AppResult<Record<EntUser>> {
        self.lookup(&identity.external_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))
    }

    /// Exact match on `externalId` (preferred) or `username`; no filter lists everyone
    pub async fn find(&self, query: &UserQuery) -> AppResult<Vec<Record<EntUser>>> {
        let filters = match (&query.external_id, &query.username) {
            (Some(external_id), _) => vec![Filter::eq("externalId", external_id.as_str())],
            (None, Some(username)) => vec![Filter::eq("username", username.as_str())],
            (None, None) => Vec::new(),
        };
        EntUser::gen_where(self.store.as_ref(), &DocQuery::filtered(filters)).await
    }

    pub async fn create(
        &self,
        identity: &Identity,
        request: CreateUserRequest,
    ) -> AppResult<Record<EntUser>> {
        let user = request.into_user(identity)?;
        if self.lookup(&identity.external_id).await?.is_some() {
            return Err(AppError::Conflict("User profile already exists".to_string()));
        }

        match self.insert_profile(identity, user).await? {
            (record, true) => Ok(record),
            (_, false) => Err(AppError::Conflict("User profile already exists".to_string())),
        }
    }

    pub async fn update_profile(
        &self,
        identity: &Identity,
        patch: UpdateProfileRequest,
    ) -> AppResult<Record<EntUser>> {
        patch.validate()?;
        let current = self.resolve(identity).await?;
        EntUser::gen_modify(self.store.as_ref(), current.id, |user| {
            patch.apply_to(user);
            Ok(())
        })
        .await
    }

    /// Summaries for referenced users; any missing user is `NotFound`
    pub async fn summaries(&self, ids: &[DocId]) -> AppResult<HashMap<DocId, UserSummary>> {
        let users = EntUser::load_many(self.store.as_ref(), ids).await?;
        if let Some(missing) = ids.iter().find(|id| !users.contains_key(id)) {
            return Err(EntUser::not_found(*missing));
        }

        Ok(users
            .iter()
            .map(|(id, record)| (*id, UserSummary::from(record)))
            .collect())
    }

    pub async fn summary(&self, id: DocId) -> AppResult<UserSummary> {
        let record = EntUser::gen_enforce(self.store.as_ref(), id).await?;
        Ok(UserSummary::from(&record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::SqliteStore;
    use async_trait::async_trait;

    struct StaticProvider;

    #[async_trait]
    impl IdentityProvider for StaticProvider {
        async fn verify(&self, token: &str) -> AppResult<Identity> {
            Ok(Identity::new(token))
        }

        async fn profile(&self, external_id: &str) -> AppResult<Option<ProfileAttributes>> {
            if external_id == "ghost" {
                return Ok(None);
            }
            Ok(Some(ProfileAttributes {
                email: Some(format!("{}@Campus.edu", external_id)),
                first_name: Some("Ada".to_string()),
                ..ProfileAttributes::default()
            }))
        }
    }

    async fn directory() -> UserDirectory {
        let store = SqliteStore::new_in_memory().await.unwrap();
        for field in ["externalId", "email", "username"] {
            store.ensure_unique_index("users", field).await.unwrap();
        }
        UserDirectory::new(
            Arc::new(store),
            Arc::new(StaticProvider),
            Arc::new(DocIdGenerator::new(1)),
            Arc::new(Cache::new(16)),
        )
    }

    #[test]
    fn test_fallback_username() {
        assert_eq!(fallback_username("user_2abcdef123456"), "user_123456");
        assert_eq!(fallback_username("abc"), "user_abc");
    }

    #[tokio::test]
    async fn test_ensure_creates_once() {
        let directory = directory().await;
        let identity = Identity::new("user_2abcdef123456");

        let (first, created) = directory.ensure(&identity).await.unwrap();
        assert!(created);
        assert_eq!(first.data.username, "user_123456");
        assert_eq!(first.data.email, "user_2abcdef123456@campus.edu");
        assert!(first.data.bio.is_empty());

        let (second, created) = directory.ensure(&identity).await.unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn test_concurrent_ensure_never_duplicates() {
        let directory = directory().await;
        let identity = Identity::new("user_race01");

        let calls = (0..8).map(|_| directory.ensure(&identity));
        let results = futures::future::join_all(calls).await;
        let ids: Vec<DocId> = results.into_iter().map(|r| r.unwrap().0.id).collect();
        assert!(ids.iter().all(|id| *id == ids[0]));

        let all = directory.find(&UserQuery::default()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_provider_user_is_not_found() {
        let directory = directory().await;
        let err = directory.ensure(&Identity::new("ghost")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = directory.resolve(&Identity::new("ghost")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_summaries_require_every_user() {
        let directory = directory().await;
        let (user, _) = directory.ensure(&Identity::new("user_a1")).await.unwrap();

        let summaries = directory.summaries(&[user.id, user.id]).await.unwrap();
        assert_eq!(summaries.len(), 1);

        let err = directory
            .summaries(&[user.id, DocId::new(999)])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
