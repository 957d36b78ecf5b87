pub mod dto;
pub mod handlers;
pub mod repo;

use crate::state::AppState;
use axum::Router;

/// Reads are public; every write needs an admin.
pub fn router() -> Router<AppState> {
    handlers::project_routes()
}
