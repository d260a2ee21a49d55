//! In-memory repository implementation.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use pgcdt_core::contact::{encode_phone_numbers, encode_tagged_phone_numbers, Contact};
use pgcdt_core::person::{NewUser, User};
use pgcdt_core::storage::{
    ContactRepository, RepositoryError, Result, TaggedContactRepository, UserRepository,
};

/// In-memory storage backend.
///
/// Rows keep insertion order, like a heap table scanned without `ORDER BY`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    contacts: Arc<RwLock<Vec<Contact>>>,
    tagged_contacts: Arc<RwLock<Vec<Contact>>>,
    users: Arc<RwLock<UserTable>>,
}

#[derive(Debug, Default)]
struct UserTable {
    rows: Vec<User>,
    last_id: i32,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for InMemoryRepository {
    async fn fetch_all(&self) -> Result<Vec<Contact>> {
        Ok(self.contacts.read().await.clone())
    }

    async fn fetch_with_label(&self, label: &str) -> Result<Vec<Contact>> {
        let contacts = self.contacts.read().await;
        Ok(contacts
            .iter()
            .filter(|c| c.has_label(label))
            .cloned()
            .collect())
    }

    async fn persist(&self, contacts: &[Contact]) -> Result<u64> {
        // Same contract as the database: the directory must encode.
        for contact in contacts {
            encode_phone_numbers(&contact.phone_numbers)?;
        }

        insert_unique(&mut *self.contacts.write().await, contacts)
    }
}

#[async_trait]
impl TaggedContactRepository for InMemoryRepository {
    async fn fetch_all(&self) -> Result<Vec<Contact>> {
        Ok(self.tagged_contacts.read().await.clone())
    }

    async fn fetch_with_tag(&self, tag: &str) -> Result<Vec<Contact>> {
        let contacts = self.tagged_contacts.read().await;
        Ok(contacts
            .iter()
            .filter(|c| c.has_label(tag))
            .cloned()
            .collect())
    }

    async fn fetch_numbers_with_tag(&self, tag: &str) -> Result<Vec<i64>> {
        let contacts = self.tagged_contacts.read().await;
        Ok(contacts
            .iter()
            .filter_map(|c| c.phone_numbers.get(tag).copied())
            .collect())
    }

    async fn persist(&self, contacts: &[Contact]) -> Result<u64> {
        for contact in contacts {
            encode_tagged_phone_numbers(&contact.phone_numbers)?;
        }

        insert_unique(&mut *self.tagged_contacts.write().await, contacts)
    }
}

/// Appends `contacts` unless an email repeats, within the batch or against
/// stored rows, in which case nothing is stored.
fn insert_unique(stored: &mut Vec<Contact>, contacts: &[Contact]) -> Result<u64> {
    let mut emails: HashSet<&str> = stored.iter().map(|c| c.email.as_str()).collect();
    for contact in contacts {
        if !emails.insert(contact.email.as_str()) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Contact",
                id: contact.email.clone(),
            });
        }
    }
    drop(emails);

    stored.extend_from_slice(contacts);
    Ok(contacts.len() as u64)
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn fetch_all(&self) -> Result<Vec<User>> {
        Ok(self.users.read().await.rows.clone())
    }

    async fn fetch_by_pin_code(&self, pin_code: i32) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(users
            .rows
            .iter()
            .filter(|u| u.address.pin_code == pin_code)
            .cloned()
            .collect())
    }

    async fn persist(&self, users: &[NewUser]) -> Result<u64> {
        let mut table = self.users.write().await;
        for user in users {
            table.last_id += 1;
            let id = table.last_id;
            table.rows.push(user.clone().into_user(id));
        }
        Ok(users.len() as u64)
    }
}
