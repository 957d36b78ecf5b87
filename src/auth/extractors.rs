//! Access guard: `authenticate` resolves the caller, `authorize` checks the role.
//!
//! Handlers opt in per route with the `AuthUser` / `AdminUser` extractors;
//! whole routers can be wrapped with the `require_admin` middleware.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use super::{
    jwt::TokenError,
    repo_types::{Role, User},
};
use crate::{error::AppError, state::AppState};

/// Identity resolved for the current request, re-read from the store.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for CurrentUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header"))?;

    let (scheme, token) = raw
        .split_once(' ')
        .ok_or(AppError::Unauthorized("Invalid Authorization header"))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AppError::Unauthorized("Invalid Authorization header"));
    }
    Ok(token)
}

/// Verifies the bearer token and loads the account it names.
pub async fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<CurrentUser, AppError> {
    let token = bearer_token(headers)?;

    let claims = state.keys.verify(token).map_err(|e| {
        warn!(reason = %e, "rejected bearer token");
        match e {
            TokenError::Expired => AppError::Unauthorized("Token has expired"),
            TokenError::Invalid => AppError::Unauthorized("Invalid token"),
        }
    })?;

    let user = state.users.find_by_id(claims.sub).await?.ok_or_else(|| {
        warn!(user_id = %claims.sub, "token subject no longer exists");
        AppError::Unauthorized("Invalid token")
    })?;

    Ok(user.into())
}

pub fn authorize(user: &CurrentUser, required: Role) -> Result<(), AppError> {
    if user.role.satisfies(required) {
        Ok(())
    } else {
        warn!(user_id = %user.id, role = %user.role, required = %required, "access denied");
        Err(AppError::Forbidden)
    }
}

/// Any signed-in account.
pub struct AuthUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // already resolved by a middleware further out
        if let Some(user) = parts.extensions.get::<CurrentUser>().cloned() {
            return Ok(AuthUser(user));
        }
        let user = authenticate(&parts.headers, state).await?;
        parts.extensions.insert(user.clone());
        Ok(AuthUser(user))
    }
}

/// Signed-in account with the admin role.
pub struct AdminUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        authorize(&user, Role::Admin)?;
        Ok(AdminUser(user))
    }
}

/// Middleware for routers where every route is admin only.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(req.headers(), &state).await?;
    authorize(&user, Role::Admin)?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
