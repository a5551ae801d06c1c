use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{ContactRepository, UpdatedContact};
use crate::{
    error::AppResult,
    models::{Contact, ContactChanges, ContactFilter, NewContact, PageRequest},
};

const CONTACT_COLUMNS: &str = "id, name, email, address, phone, favorite, avatar";

#[derive(Clone)]
pub struct PgContactRepository {
    db: PgPool,
}

impl PgContactRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Escapes `LIKE` wildcards so the needle matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ContactFilter) {
    let mut separator = " WHERE ";
    if let Some(favorite) = filter.favorite {
        builder
            .push(separator)
            .push("favorite = ")
            .push_bind(i16::from(favorite));
        separator = " AND ";
    }
    if let Some(name) = &filter.name {
        builder
            .push(separator)
            .push("name ILIKE ")
            .push_bind(like_pattern(name));
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn list_by_filter(
        &self,
        filter: &ContactFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Contact>, u64)> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM contacts");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.db)
            .await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM contacts",
            CONTACT_COLUMNS
        ));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY id ASC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let contacts: Vec<Contact> = select.build_query_as().fetch_all(&self.db).await?;

        Ok((contacts, total.max(0) as u64))
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<Contact>> {
        let contact: Option<Contact> = sqlx::query_as(&format!(
            "SELECT {} FROM contacts WHERE id = $1",
            CONTACT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(contact)
    }

    async fn create(&self, contact: NewContact) -> AppResult<Contact> {
        let contact: Contact = sqlx::query_as(&format!(
            r#"
            INSERT INTO contacts (name, email, address, phone, favorite, avatar)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CONTACT_COLUMNS
        ))
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.address)
        .bind(&contact.phone)
        .bind(contact.favorite)
        .bind(&contact.avatar)
        .fetch_one(&self.db)
        .await?;

        Ok(contact)
    }

    async fn update(
        &self,
        id: i64,
        changes: ContactChanges,
    ) -> AppResult<Option<UpdatedContact>> {
        // The row lock in `previous` serializes concurrent updates, so each
        // one sees the avatar written by the one before it.
        let updated: Option<UpdatedContact> = sqlx::query_as(
            r#"
            WITH previous AS (
                SELECT id, avatar FROM contacts WHERE id = $1 FOR UPDATE
            )
            UPDATE contacts AS c
            SET name = COALESCE($2, c.name),
                email = COALESCE($3, c.email),
                address = COALESCE($4, c.address),
                phone = COALESCE($5, c.phone),
                favorite = COALESCE($6, c.favorite),
                avatar = COALESCE($7, c.avatar)
            FROM previous
            WHERE c.id = previous.id
            RETURNING c.id, c.name, c.email, c.address, c.phone, c.favorite, c.avatar,
                      previous.avatar AS previous_avatar
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.address)
        .bind(&changes.phone)
        .bind(changes.favorite)
        .bind(&changes.avatar)
        .fetch_optional(&self.db)
        .await?;

        Ok(updated)
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_all(&self) -> AppResult<Vec<Contact>> {
        let removed: Vec<Contact> = sqlx::query_as(&format!(
            "DELETE FROM contacts RETURNING {}",
            CONTACT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(removed)
    }
}
