use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, PublicUser, SigninRequest, SignupRequest},
        extractors::AuthUser,
        services,
    },
    error::AppError,
    response::{Ack, Item},
    state::AppState,
    validation::Payload,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/signout", post(signout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Payload(payload): Payload<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let out = services::signup(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User created successfully".into(),
            token: out.token,
            user: out.user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    Payload(payload): Payload<SigninRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let out = services::signin(&state, payload).await?;
    Ok(Json(AuthResponse {
        success: true,
        message: "User signed in successfully".into(),
        token: out.token,
        user: out.user.into(),
    }))
}

/// Tokens are stateless; the client drops its copy.
pub async fn signout() -> Json<Ack> {
    Json(Ack::new("User signed out successfully"))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
) -> Result<Json<Item<PublicUser>>, AppError> {
    let user = state
        .users
        .find_by_id(current.id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(Item::new(user.into())))
}
