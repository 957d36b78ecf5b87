use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Web,
    Mobile,
    Desktop,
    Other,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub technologies: String,
    pub image_url: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub category: Category,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub technologies: String,
    pub image_url: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub category: Category,
}

/// `None` keeps the stored value. The links can also be cleared with `Some(None)`.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<String>,
    pub image_url: Option<Option<String>>,
    pub github_url: Option<Option<String>>,
    pub live_url: Option<Option<String>>,
    pub category: Option<Category>,
}

const PROJECT_COLUMNS: &str = "id, title, description, technologies, image_url, github_url, \
                               live_url, category, created_at, updated_at";

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<Project>> {
    sqlx::query_as::<_, Project>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await
}

pub async fn find(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Project>> {
    sqlx::query_as::<_, Project>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn create(db: &PgPool, p: NewProject) -> sqlx::Result<Project> {
    sqlx::query_as::<_, Project>(&format!(
        r#"
        INSERT INTO projects
            (id, title, description, technologies, image_url, github_url, live_url, category)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {PROJECT_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(p.title)
    .bind(p.description)
    .bind(p.technologies)
    .bind(p.image_url)
    .bind(p.github_url)
    .bind(p.live_url)
    .bind(p.category)
    .fetch_one(db)
    .await
}

pub async fn update(db: &PgPool, id: Uuid, p: ProjectPatch) -> sqlx::Result<Option<Project>> {
    sqlx::query_as::<_, Project>(&format!(
        r#"
        UPDATE projects
           SET title = COALESCE($2, title),
               description = COALESCE($3, description),
               technologies = COALESCE($4, technologies),
               image_url = CASE WHEN $5 THEN $6 ELSE image_url END,
               github_url = CASE WHEN $7 THEN $8 ELSE github_url END,
               live_url = CASE WHEN $9 THEN $10 ELSE live_url END,
               category = COALESCE($11, category),
               updated_at = now()
         WHERE id = $1
        RETURNING {PROJECT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(p.title)
    .bind(p.description)
    .bind(p.technologies)
    .bind(p.image_url.is_some())
    .bind(p.image_url.flatten())
    .bind(p.github_url.is_some())
    .bind(p.github_url.flatten())
    .bind(p.live_url.is_some())
    .bind(p.live_url.flatten())
    .bind(p.category)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn delete_all(db: &PgPool) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM projects").execute(db).await?;
    Ok(res.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_serialize_with_camel_case_keys() {
        let now = OffsetDateTime::now_utc();
        let project = Project {
            id: Uuid::new_v4(),
            title: "T".into(),
            description: "D".into(),
            technologies: "Rust".into(),
            image_url: Some("/i.png".into()),
            github_url: None,
            live_url: None,
            category: Category::Desktop,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["imageUrl"], "/i.png");
        assert!(json["githubUrl"].is_null());
        assert_eq!(json["category"], "desktop");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("image_url").is_none());
    }
}
