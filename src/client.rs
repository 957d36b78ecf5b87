//! Typed HTTP client for the API.
//!
//! There is no ambient auth header: every protected call takes the `Session`
//! returned by `signup`/`signin`, so two sessions can share one client.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use crate::{
    auth::{
        dto::{AuthResponse, PublicUser},
        Role,
    },
    response::{Item, List},
};

/// Token and account returned by a successful signup or signin.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

impl Session {
    /// Role as of login. The server re-checks it on every call.
    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }
}

impl From<AuthResponse> for Session {
    fn from(r: AuthResponse) -> Self {
        Self {
            token: r.token,
            user: r.user,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct PortfolioClient {
    http: reqwest::Client,
    base_url: String,
}

impl PortfolioClient {
    /// `base_url` is the server root, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    pub fn public(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    pub fn authorized(&self, session: &Session, method: Method, path: &str) -> RequestBuilder {
        self.public(method, path).bearer_auth(&session.token)
    }

    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        let res = self
            .public(Method::POST, "/auth/signup")
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;
        Ok(read::<AuthResponse>(res).await?.into())
    }

    pub async fn signin(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let res = self
            .public(Method::POST, "/auth/signin")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(read::<AuthResponse>(res).await?.into())
    }

    /// Consumes the session; the token is simply forgotten.
    pub async fn signout(&self, session: Session) -> Result<(), ClientError> {
        let res = self
            .authorized(&session, Method::POST, "/auth/signout")
            .send()
            .await?;
        read::<serde_json::Value>(res).await?;
        Ok(())
    }

    pub async fn me(&self, session: &Session) -> Result<PublicUser, ClientError> {
        let res = self.authorized(session, Method::GET, "/auth/me").send().await?;
        Ok(read::<Item<PublicUser>>(res).await?.data)
    }

    /// `GET` a list endpoint, with or without a session.
    pub async fn list<T: DeserializeOwned>(
        &self,
        session: Option<&Session>,
        path: &str,
    ) -> Result<Vec<T>, ClientError> {
        let req = match session {
            Some(s) => self.authorized(s, Method::GET, path),
            None => self.public(Method::GET, path),
        };
        Ok(read::<List<T>>(req.send().await?).await?.data)
    }

    /// `POST` a body and return the created item.
    pub async fn create<B: Serialize, T: DeserializeOwned>(
        &self,
        session: Option<&Session>,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let req = match session {
            Some(s) => self.authorized(s, Method::POST, path),
            None => self.public(Method::POST, path),
        };
        Ok(read::<Item<T>>(req.json(body).send().await?).await?.data)
    }
}

async fn read<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json().await?);
    }
    let message = match res.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
    };
    Err(ClientError::Api { status, message })
}
