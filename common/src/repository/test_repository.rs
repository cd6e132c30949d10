use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    entities::contact::{Contact, NewContact},
    error::{self, ServiceError},
};

use super::{Backend, ContactRepository};

/// In-memory repository for tests. Counts `create` calls and can be told
/// to fail every operation.
#[derive(Default)]
pub struct TestRepository {
    pub db: Mutex<Vec<Contact>>,
    next_id: AtomicUsize,
    create_calls: AtomicUsize,
    failing: AtomicBool,
}

impl TestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let repo = Self::default();
        repo.set_failing(true);
        repo
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> error::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ServiceError::persistence("test repository is unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl ContactRepository for TestRepository {
    fn backend(&self) -> Backend {
        Backend::Memory
    }

    async fn create(&self, contact: &NewContact) -> error::Result<Contact> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let contact = Contact::from_new(id.to_string(), contact, Utc::now());
        self.db
            .lock()
            .map_err(|_| ServiceError::persistence("test repository lock poisoned"))?
            .push(contact.clone());
        Ok(contact)
    }

    async fn list(&self) -> error::Result<Vec<Contact>> {
        self.check()?;
        let db = self
            .db
            .lock()
            .map_err(|_| ServiceError::persistence("test repository lock poisoned"))?;
        // insertion order breaks timestamp ties
        let mut contacts: Vec<Contact> = db.iter().rev().cloned().collect();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(contacts)
    }

    async fn delete(&self, id: &str) -> error::Result<bool> {
        self.check()?;
        let mut db = self
            .db
            .lock()
            .map_err(|_| ServiceError::persistence("test repository lock poisoned"))?;
        let before = db.len();
        db.retain(|contact| contact.id != id);
        Ok(db.len() != before)
    }
}
