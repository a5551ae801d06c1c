use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{AvatarUpload, Contact, ContactFilter, ContactInput, PageRequest, PaginationMetadata},
    storage::{AvatarStore, ContactRepository},
};

pub struct ContactsService {
    repo: Arc<dyn ContactRepository>,
    avatars: AvatarStore,
}

impl ContactsService {
    pub fn new(repo: Arc<dyn ContactRepository>, avatars: AvatarStore) -> Self {
        Self { repo, avatars }
    }

    /// List contacts matching the filter, one page at a time
    pub async fn list_contacts(
        &self,
        filter: &ContactFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Contact>, PaginationMetadata)> {
        let (contacts, total) = self.repo.list_by_filter(filter, page).await?;
        Ok((contacts, PaginationMetadata::new(total, page)))
    }

    pub async fn get_contact(&self, id: i64) -> AppResult<Contact> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(AppError::ContactNotFound)
    }

    /// Create a contact, storing the avatar first when one was uploaded
    pub async fn create_contact(
        &self,
        input: ContactInput,
        avatar: Option<AvatarUpload>,
    ) -> AppResult<Contact> {
        let mut contact = input.into_new_contact()?;

        if let Some(avatar) = avatar {
            contact.avatar = Some(self.avatars.upload_file(avatar.data, avatar.extension).await?);
        }
        let stored_avatar = contact.avatar.clone();

        match self.repo.create(contact).await {
            Ok(contact) => {
                tracing::info!("Created contact {}", contact.id);
                Ok(contact)
            }
            Err(e) => {
                self.discard_avatar(stored_avatar.as_deref()).await;
                Err(e)
            }
        }
    }

    /// Apply a partial update; a new avatar replaces the stored one
    pub async fn update_contact(
        &self,
        id: i64,
        input: ContactInput,
        avatar: Option<AvatarUpload>,
    ) -> AppResult<Contact> {
        let mut changes = input.into_changes()?;
        if changes.is_empty() && avatar.is_none() {
            return Err(AppError::validation("No fields to update"));
        }

        self.get_contact(id).await?;

        if let Some(avatar) = avatar {
            changes.avatar = Some(self.avatars.upload_file(avatar.data, avatar.extension).await?);
        }
        let new_avatar = changes.avatar.clone();

        let updated = match self.repo.update(id, changes).await {
            Ok(Some(contact)) => contact,
            Ok(None) => {
                self.discard_avatar(new_avatar.as_deref()).await;
                return Err(AppError::ContactNotFound);
            }
            Err(e) => {
                self.discard_avatar(new_avatar.as_deref()).await;
                return Err(e);
            }
        };

        if new_avatar.is_some() {
            self.discard_avatar(updated.previous_avatar.as_deref()).await;
        }

        Ok(updated.contact)
    }

    pub async fn delete_contact(&self, id: i64) -> AppResult<()> {
        let existing = self.get_contact(id).await?;

        if self.repo.delete_by_id(id).await? == 0 {
            return Err(AppError::ContactNotFound);
        }
        self.discard_avatar(existing.avatar.as_deref()).await;

        Ok(())
    }

    /// Remove every contact and its avatar. Succeeds even when nothing was stored.
    pub async fn delete_all_contacts(&self) -> AppResult<u64> {
        let removed = self.repo.delete_all().await?;
        for contact in &removed {
            self.discard_avatar(contact.avatar.as_deref()).await;
        }
        tracing::info!("Deleted {} contacts", removed.len());
        Ok(removed.len() as u64)
    }

    async fn discard_avatar(&self, url: Option<&str>) {
        let Some(url) = url else {
            return;
        };
        if let Err(e) = self.avatars.delete_file(url).await {
            tracing::warn!("Failed to remove avatar {}: {}", url, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::UploadConfig, storage::MemoryContactRepository};
    use bytes::Bytes;

    fn service(public_dir: &std::path::Path) -> ContactsService {
        let avatars = AvatarStore::new(&UploadConfig {
            public_dir: public_dir.to_path_buf(),
            max_avatar_bytes: 1024,
        });
        ContactsService::new(Arc::new(MemoryContactRepository::new()), avatars)
    }

    fn png() -> AvatarUpload {
        AvatarUpload {
            content_type: "image/png".into(),
            extension: "png",
            data: Bytes::from_static(b"\x89PNG"),
        }
    }

    fn named(name: &str) -> ContactInput {
        ContactInput {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    fn avatar_path(root: &std::path::Path, url: &str) -> std::path::PathBuf {
        root.join("avatars").join(url.rsplit('/').next().unwrap())
    }

    #[tokio::test]
    async fn invalid_input_writes_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());

        let result = service.create_contact(ContactInput::default(), Some(png())).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(!tmp.path().join("avatars").exists());
    }

    #[tokio::test]
    async fn replacing_avatar_removes_previous_file() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());

        let created = service.create_contact(named("Ann"), Some(png())).await.unwrap();
        let first = created.avatar.clone().unwrap();
        assert!(avatar_path(tmp.path(), &first).exists());

        let updated = service
            .update_contact(created.id, ContactInput::default(), Some(png()))
            .await
            .unwrap();
        let second = updated.avatar.unwrap();
        assert_ne!(first, second);
        assert!(!avatar_path(tmp.path(), &first).exists());
        assert!(avatar_path(tmp.path(), &second).exists());
    }

    #[tokio::test]
    async fn update_of_missing_contact_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());

        let result = service.update_contact(7, named("Zed"), Some(png())).await;
        assert!(matches!(result, Err(AppError::ContactNotFound)));
        assert!(!tmp.path().join("avatars").exists());
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());
        let created = service.create_contact(named("Ann"), None).await.unwrap();

        let result = service
            .update_contact(created.id, ContactInput::default(), None)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn delete_removes_contact_and_avatar() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());
        let created = service.create_contact(named("Ann"), Some(png())).await.unwrap();
        let avatar = created.avatar.unwrap();

        service.delete_contact(created.id).await.unwrap();
        assert!(!avatar_path(tmp.path(), &avatar).exists());
        assert!(matches!(
            service.delete_contact(created.id).await,
            Err(AppError::ContactNotFound)
        ));
    }

    #[tokio::test]
    async fn delete_all_succeeds_when_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());
        assert_eq!(service.delete_all_contacts().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_all_removes_every_avatar() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());
        let ann = service.create_contact(named("Ann"), Some(png())).await.unwrap();
        let bob = service.create_contact(named("Bob"), Some(png())).await.unwrap();
        service.create_contact(named("Cat"), None).await.unwrap();

        assert_eq!(service.delete_all_contacts().await.unwrap(), 3);
        for avatar in [ann.avatar.unwrap(), bob.avatar.unwrap()] {
            assert!(!avatar_path(tmp.path(), &avatar).exists());
        }
    }

    #[tokio::test]
    async fn concurrent_avatar_updates_leave_only_the_last_file() {
        let tmp = tempfile::tempdir().unwrap();
        let service = Arc::new(service(tmp.path()));
        let id = service
            .create_contact(named("Ann"), Some(png()))
            .await
            .unwrap()
            .id;

        let first = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .update_contact(id, ContactInput::default(), Some(png()))
                    .await
            })
        };
        let second = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .update_contact(id, ContactInput::default(), Some(png()))
                    .await
            })
        };
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let current = service.get_contact(id).await.unwrap().avatar.unwrap();
        let files: Vec<_> = std::fs::read_dir(tmp.path().join("avatars"))
            .unwrap()
            .collect();
        assert_eq!(files.len(), 1);
        assert!(avatar_path(tmp.path(), &current).exists());
    }
}
