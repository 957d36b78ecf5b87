pub mod dto;
pub mod handlers;

use axum::{middleware, Router};

use crate::{auth::extractors::require_admin, state::AppState};

/// Account management. Every route is behind the admin guard.
pub fn router(state: &AppState) -> Router<AppState> {
    handlers::user_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
}
