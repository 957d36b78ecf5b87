use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::ContactBody,
    repo::{self, Contact},
};
use crate::{
    auth::AdminUser,
    error::AppError,
    response::{Ack, Item, List},
    state::AppState,
    validation::{IdPath, Payload},
};

pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/contacts",
            get(list_contacts).post(create_contact).delete(delete_all_contacts),
        )
        .route(
            "/contacts/:id",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
}

/// Public: anyone may leave a message.
#[instrument(skip(state, payload))]
pub async fn create_contact(
    State(state): State<AppState>,
    Payload(payload): Payload<ContactBody>,
) -> Result<(StatusCode, Json<Item<Contact>>), AppError> {
    let contact = repo::create(&state.db, payload.into_new()?).await?;
    info!(contact_id = %contact.id, "contact message received");
    Ok((
        StatusCode::CREATED,
        Json(Item::with_message(contact, "Message sent successfully")),
    ))
}

#[instrument(skip(state))]
pub async fn list_contacts(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<List<Contact>>, AppError> {
    Ok(Json(List::new(repo::list(&state.db).await?)))
}

#[instrument(skip(state))]
pub async fn get_contact(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    IdPath(id): IdPath<Uuid>,
) -> Result<Json<Item<Contact>>, AppError> {
    let contact = repo::find(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Contact"))?;
    Ok(Json(Item::new(contact)))
}

#[instrument(skip(state, payload))]
pub async fn update_contact(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    IdPath(id): IdPath<Uuid>,
    Payload(payload): Payload<ContactBody>,
) -> Result<Json<Item<Contact>>, AppError> {
    let contact = repo::update(&state.db, id, payload.into_patch()?)
        .await?
        .ok_or(AppError::NotFound("Contact"))?;
    info!(contact_id = %id, admin_id = %admin.id, "contact updated");
    Ok(Json(Item::with_message(contact, "Contact updated successfully")))
}

#[instrument(skip(state))]
pub async fn delete_contact(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    IdPath(id): IdPath<Uuid>,
) -> Result<Json<Ack>, AppError> {
    if !repo::delete(&state.db, id).await? {
        return Err(AppError::NotFound("Contact"));
    }
    info!(contact_id = %id, admin_id = %admin.id, "contact deleted");
    Ok(Json(Ack::new("Contact deleted successfully")))
}

#[instrument(skip(state))]
pub async fn delete_all_contacts(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Ack>, AppError> {
    let n = repo::delete_all(&state.db).await?;
    info!(deleted = n, admin_id = %admin.id, "all contacts deleted");
    Ok(Json(Ack::new(format!("{n} contacts deleted successfully"))))
}
