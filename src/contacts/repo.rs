use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

const CONTACT_COLUMNS: &str = "id, name, email, message, created_at, updated_at";

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<Contact>> {
    sqlx::query_as::<_, Contact>(&format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await
}

pub async fn find(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Contact>> {
    sqlx::query_as::<_, Contact>(&format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn create(db: &PgPool, c: NewContact) -> sqlx::Result<Contact> {
    sqlx::query_as::<_, Contact>(&format!(
        "INSERT INTO contacts (id, name, email, message) VALUES ($1, $2, $3, $4) \
         RETURNING {CONTACT_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(c.name)
    .bind(c.email)
    .bind(c.message)
    .fetch_one(db)
    .await
}

pub async fn update(db: &PgPool, id: Uuid, c: ContactPatch) -> sqlx::Result<Option<Contact>> {
    sqlx::query_as::<_, Contact>(&format!(
        r#"
        UPDATE contacts
           SET name = COALESCE($2, name),
               email = COALESCE($3, email),
               message = COALESCE($4, message),
               updated_at = now()
         WHERE id = $1
        RETURNING {CONTACT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(c.name)
    .bind(c.email)
    .bind(c.message)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM contacts WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn delete_all(db: &PgPool) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM contacts").execute(db).await?;
    Ok(res.rows_affected())
}
