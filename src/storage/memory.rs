use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ContactRepository, UpdatedContact};
use crate::{
    error::AppResult,
    models::{Contact, ContactChanges, ContactFilter, NewContact, PageRequest},
};

#[derive(Default)]
struct Inner {
    next_id: i64,
    contacts: BTreeMap<i64, Contact>,
}

/// In-process contact storage for local development and tests.
#[derive(Default)]
pub struct MemoryContactRepository {
    inner: RwLock<Inner>,
}

impl MemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for MemoryContactRepository {
    async fn list_by_filter(
        &self,
        filter: &ContactFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Contact>, u64)> {
        let inner = self.inner.read().await;
        let matching: Vec<&Contact> = inner
            .contacts
            .values()
            .filter(|contact| filter.matches(contact))
            .collect();
        let total = matching.len() as u64;

        let contacts = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();

        Ok((contacts, total))
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<Contact>> {
        Ok(self.inner.read().await.contacts.get(&id).cloned())
    }

    async fn create(&self, contact: NewContact) -> AppResult<Contact> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let contact = Contact {
            id: inner.next_id,
            name: contact.name,
            email: contact.email,
            address: contact.address,
            phone: contact.phone,
            favorite: contact.favorite,
            avatar: contact.avatar,
        };
        inner.contacts.insert(contact.id, contact.clone());

        Ok(contact)
    }

    async fn update(
        &self,
        id: i64,
        changes: ContactChanges,
    ) -> AppResult<Option<UpdatedContact>> {
        let mut inner = self.inner.write().await;
        let Some(contact) = inner.contacts.get_mut(&id) else {
            return Ok(None);
        };
        let previous_avatar = contact.avatar.clone();

        if let Some(name) = changes.name {
            contact.name = name;
        }
        if let Some(email) = changes.email {
            contact.email = Some(email);
        }
        if let Some(address) = changes.address {
            contact.address = Some(address);
        }
        if let Some(phone) = changes.phone {
            contact.phone = Some(phone);
        }
        if let Some(favorite) = changes.favorite {
            contact.favorite = favorite;
        }
        if let Some(avatar) = changes.avatar {
            contact.avatar = Some(avatar);
        }

        Ok(Some(UpdatedContact {
            contact: contact.clone(),
            previous_avatar,
        }))
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<u64> {
        let removed = self.inner.write().await.contacts.remove(&id);
        Ok(u64::from(removed.is_some()))
    }

    async fn delete_all(&self) -> AppResult<Vec<Contact>> {
        let mut inner = self.inner.write().await;
        Ok(std::mem::take(&mut inner.contacts).into_values().collect())
    }
}
