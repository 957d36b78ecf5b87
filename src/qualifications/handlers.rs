use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{end_before_start, QualificationBody, END_BEFORE_START},
    repo::{self, Qualification},
};
use crate::{
    auth::AdminUser,
    error::{AppError, FieldError},
    response::{Ack, Item, List},
    state::AppState,
    validation::{IdPath, Payload},
};

pub fn qualification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/qualifications",
            get(list_qualifications)
                .post(create_qualification)
                .delete(delete_all_qualifications),
        )
        .route(
            "/qualifications/:id",
            get(get_qualification)
                .put(update_qualification)
                .delete(delete_qualification),
        )
}

#[instrument(skip(state))]
pub async fn list_qualifications(
    State(state): State<AppState>,
) -> Result<Json<List<Qualification>>, AppError> {
    Ok(Json(List::new(repo::list(&state.db).await?)))
}

#[instrument(skip(state))]
pub async fn get_qualification(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<Json<Item<Qualification>>, AppError> {
    let q = repo::find(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Qualification"))?;
    Ok(Json(Item::new(q)))
}

#[instrument(skip(state, payload))]
pub async fn create_qualification(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Payload(payload): Payload<QualificationBody>,
) -> Result<(StatusCode, Json<Item<Qualification>>), AppError> {
    let q = repo::create(&state.db, payload.into_new()?).await?;
    info!(qualification_id = %q.id, admin_id = %admin.id, "qualification created");
    Ok((
        StatusCode::CREATED,
        Json(Item::with_message(q, "Qualification created successfully")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_qualification(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    IdPath(id): IdPath<Uuid>,
    Payload(payload): Payload<QualificationBody>,
) -> Result<Json<Item<Qualification>>, AppError> {
    let patch = payload.into_patch()?;

    // A lone start or end date still has to respect the stored counterpart.
    let lone_start = patch.start_date.is_some() && patch.end_date.is_none();
    let lone_end = patch.start_date.is_none() && matches!(patch.end_date, Some(Some(_)));
    if lone_start || lone_end {
        let current = repo::find(&state.db, id)
            .await?
            .ok_or(AppError::NotFound("Qualification"))?;
        let start = patch.start_date.unwrap_or(current.start_date);
        let end = patch.end_date.unwrap_or(current.end_date);
        if end_before_start(start, end) {
            return Err(AppError::Validation(vec![FieldError {
                field: "endDate",
                message: END_BEFORE_START.into(),
            }]));
        }
    }

    let q = repo::update(&state.db, id, patch)
        .await?
        .ok_or(AppError::NotFound("Qualification"))?;
    info!(qualification_id = %id, admin_id = %admin.id, "qualification updated");
    Ok(Json(Item::with_message(q, "Qualification updated successfully")))
}

#[instrument(skip(state))]
pub async fn delete_qualification(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    IdPath(id): IdPath<Uuid>,
) -> Result<Json<Ack>, AppError> {
    if !repo::delete(&state.db, id).await? {
        return Err(AppError::NotFound("Qualification"));
    }
    info!(qualification_id = %id, admin_id = %admin.id, "qualification deleted");
    Ok(Json(Ack::new("Qualification deleted successfully")))
}

#[instrument(skip(state))]
pub async fn delete_all_qualifications(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Ack>, AppError> {
    let n = repo::delete_all(&state.db).await?;
    info!(deleted = n, admin_id = %admin.id, "all qualifications deleted");
    Ok(Json(Ack::new(format!("{n} qualifications deleted successfully"))))
}
