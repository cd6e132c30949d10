use std::sync::Arc;

use crate::{
    config::{BackendSelector, DatabaseConfig},
    error::{self, ServiceError},
};

use super::{
    http_repository::HttpRepository, mongo_repository::MongoRepository,
    sqlite_repository::SqliteRepository, ContactRepository, RepositoryObject,
};

/// Picks the storage backend once at startup.
///
/// Hosted credentials missing for an explicit hosted selection, or a
/// relational file that cannot be opened, come back as
/// [`ServiceError::Configuration`]; callers must not start serving then.
/// An unreachable document store degrades to the relational file.
pub struct Connector {
    config: DatabaseConfig,
}

impl Connector {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// The concrete backend asked for, with [`BackendSelector::Infer`] resolved.
    pub fn resolve(&self) -> BackendSelector {
        match self.config.selector {
            BackendSelector::Infer if self.config.has_hosted_credentials() => BackendSelector::Hosted,
            BackendSelector::Infer if self.config.mongodb_uri.is_some() => BackendSelector::Document,
            BackendSelector::Infer => BackendSelector::File,
            selector => selector,
        }
    }

    pub async fn connect(&self) -> error::Result<RepositoryObject> {
        let repository: RepositoryObject = match self.resolve() {
            BackendSelector::Hosted => Arc::new(self.hosted()?),
            BackendSelector::Document => match self.document().await {
                Ok(repository) => Arc::new(repository),
                Err(err) => {
                    log::warn!("MongoDB unavailable, falling back to SQLite: {}", err);
                    Arc::new(self.file().await?)
                }
            },
            _ => Arc::new(self.file().await?),
        };

        log::info!("Using {} backend for contacts", repository.backend());
        Ok(repository)
    }

    fn hosted(&self) -> error::Result<HttpRepository> {
        let (Some(url), Some(key)) = (&self.config.supabase_url, &self.config.supabase_key) else {
            return Err(ServiceError::configuration(
                "Hosted backend selected but SUPABASE_URL and SUPABASE_KEY are not both set",
            ));
        };
        HttpRepository::new(url, key)
    }

    async fn document(&self) -> error::Result<MongoRepository> {
        let Some(uri) = &self.config.mongodb_uri else {
            return Err(ServiceError::configuration("MONGODB_URI is not set"));
        };
        log::info!("Attempting to connect to MongoDB...");
        MongoRepository::connect(uri, &self.config.mongodb_database, self.config.connect_timeout).await
    }

    async fn file(&self) -> error::Result<SqliteRepository> {
        let path = &self.config.sqlite_path;
        SqliteRepository::open(path).await.map_err(|err| {
            ServiceError::configuration(format!(
                "Cannot initialise SQLite database at {}: {}",
                path.display(),
                err
            ))
        })
    }
}
