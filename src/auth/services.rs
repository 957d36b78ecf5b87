use tracing::{info, warn};

use crate::{
    auth::{
        dto::{SigninRequest, SignupRequest},
        repo::StoreError,
        repo_types::{NewUser, Role, User},
    },
    config::SeedAdmin,
    error::AppError,
    state::AppState,
    validation::Checks,
};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_NAME_LEN: usize = 100;

/// A freshly issued token together with the account it names.
#[derive(Debug)]
pub struct Authenticated {
    pub token: String,
    pub user: User,
}

/// Role given to a self-registered account.
pub(crate) fn signup_role(bootstrap_admin_email: Option<&str>, email: &str) -> Role {
    match bootstrap_admin_email {
        Some(admin) if admin == email => Role::Admin,
        _ => Role::User,
    }
}

pub async fn signup(state: &AppState, req: SignupRequest) -> Result<Authenticated, AppError> {
    let name = req.name.trim().to_string();
    let email = req.email.trim().to_string();

    Checks::new()
        .required("name", &name)
        .max_len("name", &name, MAX_NAME_LEN)
        .required("email", &email)
        .email("email", &email)
        .required("password", &req.password)
        .min_len("password", &req.password, MIN_PASSWORD_LEN)
        .finish()?;

    let role = signup_role(state.config.bootstrap_admin_email.as_deref(), &email);
    let password_hash = state.hasher.hash(req.password).await?;

    let user = state
        .users
        .create(NewUser {
            name,
            email,
            password_hash,
            role,
        })
        .await
        .map_err(|e| {
            if matches!(e, StoreError::DuplicateEmail) {
                warn!("signup for an email that is already registered");
            }
            e
        })?;

    if user.role == Role::Admin {
        warn!(user_id = %user.id, email = %user.email, "bootstrap admin role granted at signup");
    }

    let token = state.keys.sign(user.id)?;
    info!(user_id = %user.id, role = %user.role, "user signed up");
    Ok(Authenticated { token, user })
}

pub async fn signin(state: &AppState, req: SigninRequest) -> Result<Authenticated, AppError> {
    let email = req.email.trim().to_string();

    Checks::new()
        .required("email", &email)
        .required("password", &req.password)
        .finish()?;

    let Some(user) = state.users.find_by_email(&email).await? else {
        state.hasher.verify_absent(req.password).await;
        warn!("signin for unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !state
        .hasher
        .verify(req.password, user.password_hash.clone())
        .await
    {
        warn!(user_id = %user.id, "signin with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.keys.sign(user.id)?;
    info!(user_id = %user.id, "user signed in");
    Ok(Authenticated { token, user })
}

/// Creates the configured admin unless the email is already taken.
pub async fn seed_admin(state: &AppState, seed: &SeedAdmin) -> anyhow::Result<()> {
    let email = seed.email.trim().to_string();
    anyhow::ensure!(
        crate::validation::is_valid_email(&email),
        "SEED_ADMIN_EMAIL is not a valid email"
    );
    anyhow::ensure!(
        seed.password.chars().count() >= MIN_PASSWORD_LEN,
        "SEED_ADMIN_PASSWORD must be at least {MIN_PASSWORD_LEN} characters"
    );

    if state.users.find_by_email(&email).await?.is_some() {
        info!(email = %email, "seed admin already exists; skipping");
        return Ok(());
    }

    let password_hash = state.hasher.hash(seed.password.clone()).await?;
    let created = state
        .users
        .create(NewUser {
            name: seed.name.trim().to_string(),
            email: email.clone(),
            password_hash,
            role: Role::Admin,
        })
        .await;

    match created {
        Ok(user) => {
            warn!(user_id = %user.id, email = %user.email, "seed admin account created");
            Ok(())
        }
        // lost a race with another instance seeding the same account
        Err(StoreError::DuplicateEmail) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn signup_req(name: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    fn signin_req(email: &str, password: &str) -> SigninRequest {
        SigninRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn bootstrap_email_gets_admin_only_on_exact_match() {
        assert_eq!(signup_role(Some("root@x.com"), "root@x.com"), Role::Admin);
        assert_eq!(signup_role(Some("root@x.com"), "Root@x.com"), Role::User);
        assert_eq!(signup_role(None, "root@x.com"), Role::User);
    }

    #[tokio::test]
    async fn signup_issues_token_for_new_user() {
        let state = AppState::for_tests();
        let out = signup(&state, signup_req("A", "a@x.com", "secret1")).await.unwrap();
        assert_eq!(out.user.role, Role::User);
        assert_ne!(out.user.password_hash, "secret1");
        let claims = state.keys.verify(&out.token).unwrap();
        assert_eq!(claims.sub, out.user.id);
    }

    #[tokio::test]
    async fn signup_rejects_empty_fields() {
        let state = AppState::for_tests();
        let err = signup(&state, signup_req("", " ", "")).await.unwrap_err();
        match err {
            AppError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field).collect();
                assert!(names.contains(&"name"));
                assert!(names.contains(&"email"));
                assert!(names.contains(&"password"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_signup_creates_nothing() {
        let state = AppState::for_tests();
        signup(&state, signup_req("A", "a@x.com", "secret1")).await.unwrap();
        let err = signup(&state, signup_req("B", "a@x.com", "other-pass"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
        assert_eq!(state.users.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bootstrap_admin_signup() {
        let mut state = AppState::for_tests();
        let mut cfg = (*state.config).clone();
        cfg.bootstrap_admin_email = Some("owner@x.com".into());
        state.config = std::sync::Arc::new(cfg);

        let owner = signup(&state, signup_req("Owner", "owner@x.com", "secret1")).await.unwrap();
        assert_eq!(owner.user.role, Role::Admin);
        let other = signup(&state, signup_req("B", "b@x.com", "secret1")).await.unwrap();
        assert_eq!(other.user.role, Role::User);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let state = AppState::for_tests();
        signup(&state, signup_req("A", "a@x.com", "secret1")).await.unwrap();

        let wrong = signin(&state, signin_req("a@x.com", "wrong")).await.unwrap_err();
        let unknown = signin(&state, signin_req("nobody@x.com", "secret1")).await.unwrap_err();
        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert_eq!(wrong.status_code(), unknown.status_code());
    }

    #[tokio::test]
    async fn signin_with_correct_password() {
        let state = AppState::for_tests();
        let created = signup(&state, signup_req("A", "a@x.com", "secret1")).await.unwrap();
        let out = signin(&state, signin_req(" a@x.com ", "secret1")).await.unwrap();
        assert_eq!(out.user.id, created.user.id);
        assert_eq!(state.keys.verify(&out.token).unwrap().sub, created.user.id);
    }

    #[tokio::test]
    async fn signin_requires_both_fields() {
        let state = AppState::for_tests();
        let err = signin(&state, signin_req("", "")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn seed_admin_is_idempotent() {
        let state = AppState::for_tests();
        let seed = SeedAdmin {
            name: "Portfolio Admin".into(),
            email: "admin@x.com".into(),
            password: "admin-pass".into(),
        };
        seed_admin(&state, &seed).await.unwrap();
        seed_admin(&state, &seed).await.unwrap();

        let users = state.users.list().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Admin);
        let out = signin(&state, signin_req("admin@x.com", "admin-pass")).await.unwrap();
        assert_eq!(out.user.role, Role::Admin);
    }

    #[tokio::test]
    async fn seed_admin_rejects_short_password() {
        let state = AppState::for_tests();
        let seed = SeedAdmin {
            name: "Admin".into(),
            email: "admin@x.com".into(),
            password: "123".into(),
        };
        assert!(seed_admin(&state, &seed).await.is_err());
        assert!(state.users.list().await.unwrap().is_empty());
    }
}
