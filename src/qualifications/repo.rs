use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "qualification_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QualificationKind {
    #[default]
    Education,
    Certification,
    Experience,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Qualification {
    pub id: Uuid,
    pub degree: String,
    pub institution: String,
    pub field: String,
    #[serde(with = "iso_date")]
    pub start_date: Date,
    #[serde(with = "iso_date::option")]
    pub end_date: Option<Date>,
    pub description: Option<String>,
    pub grade: Option<String>,
    #[serde(rename = "type")]
    pub kind: QualificationKind,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewQualification {
    pub degree: String,
    pub institution: String,
    pub field: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub description: Option<String>,
    pub grade: Option<String>,
    pub kind: QualificationKind,
}

/// `None` keeps the stored value; `Some(None)` clears an optional column.
#[derive(Debug, Clone, Default)]
pub struct QualificationPatch {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub field: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Option<Date>>,
    pub description: Option<Option<String>>,
    pub grade: Option<Option<String>>,
    pub kind: Option<QualificationKind>,
}

const QUALIFICATION_COLUMNS: &str = "id, degree, institution, field, start_date, end_date, \
                                     description, grade, kind, created_at, updated_at";

pub async fn list(db: &PgPool) -> sqlx::Result<Vec<Qualification>> {
    sqlx::query_as::<_, Qualification>(&format!(
        "SELECT {QUALIFICATION_COLUMNS} FROM qualifications ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await
}

pub async fn find(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Qualification>> {
    sqlx::query_as::<_, Qualification>(&format!(
        "SELECT {QUALIFICATION_COLUMNS} FROM qualifications WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn create(db: &PgPool, q: NewQualification) -> sqlx::Result<Qualification> {
    sqlx::query_as::<_, Qualification>(&format!(
        r#"
        INSERT INTO qualifications
            (id, degree, institution, field, start_date, end_date, description, grade, kind)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {QUALIFICATION_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(q.degree)
    .bind(q.institution)
    .bind(q.field)
    .bind(q.start_date)
    .bind(q.end_date)
    .bind(q.description)
    .bind(q.grade)
    .bind(q.kind)
    .fetch_one(db)
    .await
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    q: QualificationPatch,
) -> sqlx::Result<Option<Qualification>> {
    sqlx::query_as::<_, Qualification>(&format!(
        r#"
        UPDATE qualifications
           SET degree = COALESCE($2, degree),
               institution = COALESCE($3, institution),
               field = COALESCE($4, field),
               start_date = COALESCE($5, start_date),
               end_date = CASE WHEN $6 THEN $7 ELSE end_date END,
               description = CASE WHEN $8 THEN $9 ELSE description END,
               grade = CASE WHEN $10 THEN $11 ELSE grade END,
               kind = COALESCE($12, kind),
               updated_at = now()
         WHERE id = $1
        RETURNING {QUALIFICATION_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(q.degree)
    .bind(q.institution)
    .bind(q.field)
    .bind(q.start_date)
    .bind(q.end_date.is_some())
    .bind(q.end_date.flatten())
    .bind(q.description.is_some())
    .bind(q.description.flatten())
    .bind(q.grade.is_some())
    .bind(q.grade.flatten())
    .bind(q.kind)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM qualifications WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn delete_all(db: &PgPool) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM qualifications").execute(db).await?;
    Ok(res.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn rows_serialize_dates_as_iso_with_camel_case_keys() {
        let now = OffsetDateTime::now_utc();
        let q = Qualification {
            id: Uuid::new_v4(),
            degree: "BSc".into(),
            institution: "Uni".into(),
            field: "CS".into(),
            start_date: date!(2019 - 09 - 01),
            end_date: None,
            description: None,
            grade: Some("A".into()),
            kind: QualificationKind::Experience,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["startDate"], "2019-09-01");
        assert!(json["endDate"].is_null());
        assert_eq!(json["type"], "experience");
        assert!(json.get("updatedAt").is_some());
    }
}
