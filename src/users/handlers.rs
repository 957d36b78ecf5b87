use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreateUserRequest, UpdateUserRequest};
use crate::{
    auth::{
        dto::PublicUser,
        repo_types::{NewUser, UserChanges},
        AuthUser,
    },
    error::{AppError, FieldError},
    response::{Ack, Item, List},
    state::AppState,
    validation::{IdPath, Payload},
};

/// Routes only; the admin guard is layered on by `users::router`.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(list_users).post(create_user).delete(delete_all_users),
        )
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<List<PublicUser>>, AppError> {
    let users = state.users.list().await?;
    Ok(Json(List::new(users.into_iter().map(PublicUser::from).collect())))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<Json<Item<PublicUser>>, AppError> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(Item::new(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    Payload(payload): Payload<CreateUserRequest>,
) -> Result<(StatusCode, Json<Item<PublicUser>>), AppError> {
    let req = payload.validated()?;
    let password_hash = state.hasher.hash(req.password).await?;
    let user = state
        .users
        .create(NewUser {
            name: req.name,
            email: req.email,
            password_hash,
            role: req.role.unwrap_or_default(),
        })
        .await?;

    info!(user_id = %user.id, role = %user.role, admin_id = %admin.id, "user created by admin");
    Ok((
        StatusCode::CREATED,
        Json(Item::with_message(user.into(), "User created successfully")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    IdPath(id): IdPath<Uuid>,
    Payload(payload): Payload<UpdateUserRequest>,
) -> Result<Json<Item<PublicUser>>, AppError> {
    let req = payload.validated()?;
    let password_hash = match req.password {
        Some(p) => Some(state.hasher.hash(p).await?),
        None => None,
    };
    let user = state
        .users
        .update(
            id,
            UserChanges {
                name: req.name,
                email: req.email,
                password_hash,
                role: req.role,
            },
        )
        .await?
        .ok_or(AppError::NotFound("User"))?;

    if let Some(role) = req.role {
        warn!(user_id = %id, role = %role, admin_id = %admin.id, "user role set by admin");
    }
    info!(user_id = %id, admin_id = %admin.id, "user updated");
    Ok(Json(Item::with_message(user.into(), "User updated successfully")))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    IdPath(id): IdPath<Uuid>,
) -> Result<Json<Ack>, AppError> {
    if id == admin.id {
        return Err(AppError::Validation(vec![FieldError {
            field: "id",
            message: "You cannot delete your own account".into(),
        }]));
    }
    if !state.users.delete(id).await? {
        return Err(AppError::NotFound("User"));
    }
    info!(user_id = %id, admin_id = %admin.id, "user deleted");
    Ok(Json(Ack::new("User deleted successfully")))
}

/// Removes every account except the caller's.
#[instrument(skip(state))]
pub async fn delete_all_users(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
) -> Result<Json<Ack>, AppError> {
    let n = state.users.delete_all_except(admin.id).await?;
    warn!(deleted = n, admin_id = %admin.id, "all other users deleted");
    Ok(Json(Ack::new(format!("{n} users deleted successfully"))))
}

#[cfg(test)]
mod tests {
    use crate::{
        auth::{repo_types::NewUser, Role},
        state::AppState,
        users,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn account(state: &AppState, role: Role) -> (Uuid, String) {
        let user = state
            .users
            .create(NewUser {
                name: "Admin".into(),
                email: format!("{}@x.com", Uuid::new_v4()),
                password_hash: "hash".into(),
                role,
            })
            .await
            .unwrap();
        let token = state.keys.sign(user.id).unwrap();
        (user.id, token)
    }

    fn app(state: &AppState) -> Router {
        users::router(state).with_state(state.clone())
    }

    async fn call(
        app: Router,
        method: Method,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn plain_user_is_forbidden() {
        let state = AppState::for_tests();
        let (_, token) = account(&state, Role::User).await;
        let (status, _) = call(app(&state), Method::GET, "/users", &token, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_creates_and_lists_without_hashes() {
        let state = AppState::for_tests();
        let (_, token) = account(&state, Role::Admin).await;

        let (status, body) = call(
            app(&state),
            Method::POST,
            "/users",
            &token,
            Some(json!({"name":"Bob","email":"bob@x.com","password":"secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["role"], "user");

        let (status, body) = call(app(&state), Method::GET, "/users", &token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert!(!body.to_string().contains("password"));
    }

    #[tokio::test]
    async fn password_update_is_rehashed() {
        let state = AppState::for_tests();
        let (_, token) = account(&state, Role::Admin).await;
        let (target, _) = account(&state, Role::User).await;

        let (status, _) = call(
            app(&state),
            Method::PUT,
            &format!("/users/{target}"),
            &token,
            Some(json!({"password":"newpass1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let stored = state.users.find_by_id(target).await.unwrap().unwrap();
        assert!(stored.password_hash.starts_with("$argon2id$"));
        assert!(state.hasher.verify("newpass1".into(), stored.password_hash).await);
    }

    #[tokio::test]
    async fn admin_cannot_delete_self() {
        let state = AppState::for_tests();
        let (me, token) = account(&state, Role::Admin).await;
        let uri = format!("/users/{me}");
        let (status, _) = call(app(&state), Method::DELETE, &uri, &token, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(state.users.find_by_id(me).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_all_keeps_the_caller() {
        let state = AppState::for_tests();
        let (me, token) = account(&state, Role::Admin).await;
        account(&state, Role::User).await;
        account(&state, Role::User).await;

        let (status, body) = call(app(&state), Method::DELETE, "/users", &token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "2 users deleted successfully");
        let left = state.users.list().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, me);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let state = AppState::for_tests();
        let (_, token) = account(&state, Role::Admin).await;
        let (status, body) = call(
            app(&state),
            Method::GET,
            &format!("/users/{}", Uuid::new_v4()),
            &token,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }
}
