use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::ProjectBody,
    repo::{self, Project},
};
use crate::{
    auth::AdminUser,
    error::AppError,
    response::{Ack, Item, List},
    state::AppState,
    validation::{IdPath, Payload},
};

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/projects",
            get(list_projects).post(create_project).delete(delete_all_projects),
        )
        .route(
            "/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
}

#[instrument(skip(state))]
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<List<Project>>, AppError> {
    Ok(Json(List::new(repo::list(&state.db).await?)))
}

#[instrument(skip(state))]
pub async fn get_project(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<Json<Item<Project>>, AppError> {
    let project = repo::find(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Project"))?;
    Ok(Json(Item::new(project)))
}

#[instrument(skip(state, payload))]
pub async fn create_project(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Payload(payload): Payload<ProjectBody>,
) -> Result<(StatusCode, Json<Item<Project>>), AppError> {
    let project = repo::create(&state.db, payload.into_new()?).await?;
    info!(project_id = %project.id, admin_id = %admin.id, "project created");
    Ok((
        StatusCode::CREATED,
        Json(Item::with_message(project, "Project created successfully")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_project(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    IdPath(id): IdPath<Uuid>,
    Payload(payload): Payload<ProjectBody>,
) -> Result<Json<Item<Project>>, AppError> {
    let project = repo::update(&state.db, id, payload.into_patch()?)
        .await?
        .ok_or(AppError::NotFound("Project"))?;
    info!(project_id = %id, admin_id = %admin.id, "project updated");
    Ok(Json(Item::with_message(project, "Project updated successfully")))
}

#[instrument(skip(state))]
pub async fn delete_project(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    IdPath(id): IdPath<Uuid>,
) -> Result<Json<Ack>, AppError> {
    if !repo::delete(&state.db, id).await? {
        return Err(AppError::NotFound("Project"));
    }
    info!(project_id = %id, admin_id = %admin.id, "project deleted");
    Ok(Json(Ack::new("Project deleted successfully")))
}

#[instrument(skip(state))]
pub async fn delete_all_projects(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Ack>, AppError> {
    let n = repo::delete_all(&state.db).await?;
    info!(deleted = n, admin_id = %admin.id, "all projects deleted");
    Ok(Json(Ack::new(format!("{n} projects deleted successfully"))))
}
