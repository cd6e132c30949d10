pub mod connector;
pub mod http_repository;
pub mod mongo_repository;
pub mod sqlite_repository;
pub mod test_repository;

use std::sync::Arc;

use async_trait::async_trait;
use derive_more::Display;

use crate::{
    entities::contact::{Contact, NewContact},
    error,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Backend {
    #[display(fmt = "supabase")]
    Hosted,
    #[display(fmt = "mongodb")]
    Document,
    #[display(fmt = "sqlite")]
    File,
    #[display(fmt = "memory")]
    Memory,
}

/// Storage for contact form submissions.
///
/// Implementations own storage concerns only: they assign `id` and
/// `created_at`, fill the default service, and must be safe to share
/// between concurrent requests.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    fn backend(&self) -> Backend;

    async fn create(&self, contact: &NewContact) -> error::Result<Contact>;

    /// All contacts, newest first.
    async fn list(&self) -> error::Result<Vec<Contact>>;

    /// Only used by the connectivity check and tests.
    async fn delete(&self, id: &str) -> error::Result<bool>;
}

pub type RepositoryObject = Arc<dyn ContactRepository>;
