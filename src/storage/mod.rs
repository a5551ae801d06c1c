pub mod memory;
pub mod postgres;
pub mod uploads;

use async_trait::async_trait;
use sqlx::FromRow;

use crate::{
    error::AppResult,
    models::{Contact, ContactChanges, ContactFilter, NewContact, PageRequest},
};

pub use memory::MemoryContactRepository;
pub use postgres::PgContactRepository;
pub use uploads::AvatarStore;

/// Result of an update: the stored row and the avatar it replaced.
#[derive(Debug, Clone, FromRow)]
pub struct UpdatedContact {
    #[sqlx(flatten)]
    pub contact: Contact,
    pub previous_avatar: Option<String>,
}

/// Persistence for contacts.
///
/// Missing rows are reported as `None` or a zero count; errors are reserved
/// for storage faults.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Returns one page of matching contacts, ordered by id, and the total
    /// number of matches.
    async fn list_by_filter(
        &self,
        filter: &ContactFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Contact>, u64)>;

    async fn get_by_id(&self, id: i64) -> AppResult<Option<Contact>>;

    async fn create(&self, contact: NewContact) -> AppResult<Contact>;

    /// Applies the changes atomically. `previous_avatar` is the value read
    /// under the same lock that wrote the new one.
    async fn update(
        &self,
        id: i64,
        changes: ContactChanges,
    ) -> AppResult<Option<UpdatedContact>>;

    async fn delete_by_id(&self, id: i64) -> AppResult<u64>;

    /// Removes every contact and returns the removed rows.
    async fn delete_all(&self) -> AppResult<Vec<Contact>>;
}
