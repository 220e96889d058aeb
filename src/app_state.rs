// Application State - the explicitly constructed store handle and collaborators
// shared by every request

use std::sync::Arc;

use crate::config::Config;
use crate::entities::{EntDonation, EntUser};
use crate::error::AppResult;
use crate::framework::Entity;
use crate::infrastructure::middleware::HasIdentityProvider;
use crate::infrastructure::{
    mailer_from_config, Cache, CloudinaryHost, DocIdGenerator, DocumentStore,
    HttpIdentityProvider, IdentityProvider, ImageHost, Mailer, SqliteStore,
};
use crate::services::{
    DonatedItemService, DonationService, EventService, ListingService, MediaService,
    NotificationService, UserDirectory,
};

/// Unique document fields; creation races are settled by these indexes
const UNIQUE_INDEXES: &[(&str, &str)] = &[
    (EntUser::COLLECTION, "externalId"),
    (EntUser::COLLECTION, "email"),
    (EntUser::COLLECTION, "username"),
    (EntDonation::COLLECTION, "transactionId"),
];

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub users: UserDirectory,
    pub listings: ListingService,
    pub donated_items: DonatedItemService,
    pub events: EventService,
    pub donations: DonationService,
    pub media: MediaService,
}

impl AppState {
    /// Production wiring: SQLite pool plus the HTTP collaborators from `config`
    pub async fn new(config: Config) -> anyhow::Result<(Self, SqliteStore)> {
        let sqlite = SqliteStore::connect(&config.database).await?;
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(HttpIdentityProvider::new(&config.identity)?);
        let images: Arc<dyn ImageHost> = Arc::new(CloudinaryHost::new(&config.image_host)?);
        let mailer = mailer_from_config(&config.mail)?;

        let state = Self::with_collaborators(
            config,
            Arc::new(sqlite.clone()),
            identity,
            images,
            mailer,
        )
        .await?;
        Ok((state, sqlite))
    }

    /// Wire services over already constructed collaborators
    pub async fn with_collaborators(
        config: Config,
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        images: Arc<dyn ImageHost>,
        mailer: Arc<dyn Mailer>,
    ) -> AppResult<Self> {
        for (collection, field) in UNIQUE_INDEXES {
            store.ensure_unique_index(collection, field).await?;
        }

        let ids = Arc::new(DocIdGenerator::new(config.server.node_id));
        let users = UserDirectory::new(
            store.clone(),
            identity.clone(),
            ids.clone(),
            Arc::new(Cache::new(config.cache.capacity)),
        );
        let notifications = NotificationService::new(mailer);

        Ok(Self {
            listings: ListingService::new(
                store.clone(),
                ids.clone(),
                users.clone(),
                notifications.clone(),
            ),
            donated_items: DonatedItemService::new(store.clone(), ids.clone(), notifications),
            events: EventService::new(store.clone(), ids.clone()),
            donations: DonationService::new(store.clone(), ids, users.clone()),
            media: MediaService::new(images, &config.image_host.folder),
            users,
            identity,
            store,
            config: Arc::new(config),
        })
    }
}

impl HasIdentityProvider for AppState {
    fn identity_provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }
}
