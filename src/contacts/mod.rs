pub mod dto;
pub mod handlers;
pub mod repo;

use crate::state::AppState;
use axum::Router;

/// Creating a contact is public; reading and managing them is admin only.
pub fn router() -> Router<AppState> {
    handlers::contact_routes()
}
