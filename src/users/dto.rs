use serde::Deserialize;

use crate::{
    auth::{
        services::{MAX_NAME_LEN, MIN_PASSWORD_LEN},
        Role,
    },
    error::AppError,
    validation::Checks,
};

/// Admin-side account creation. Unlike signup, the role may be chosen.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<Role>,
}

impl CreateUserRequest {
    pub fn validated(self) -> Result<Self, AppError> {
        let req = Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            ..self
        };
        Checks::new()
            .required("name", &req.name)
            .max_len("name", &req.name, MAX_NAME_LEN)
            .required("email", &req.email)
            .email("email", &req.email)
            .required("password", &req.password)
            .min_len("password", &req.password, MIN_PASSWORD_LEN)
            .finish()?;
        Ok(req)
    }
}

/// Every field is optional; a present password is re-hashed.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    pub fn validated(self) -> Result<Self, AppError> {
        let req = Self {
            name: self.name.map(|n| n.trim().to_string()),
            email: self.email.map(|e| e.trim().to_string()),
            ..self
        };
        let mut checks = Checks::new();
        if let Some(name) = &req.name {
            checks.required("name", name).max_len("name", name, MAX_NAME_LEN);
        }
        if let Some(email) = &req.email {
            checks.required("email", email).email("email", email);
        }
        if let Some(password) = &req.password {
            checks
                .required("password", password)
                .min_len("password", password, MIN_PASSWORD_LEN);
        }
        checks.finish()?;
        Ok(req)
    }
}
