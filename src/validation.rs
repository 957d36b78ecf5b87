//! Boundary checks for request bodies.

use axum::extract::{FromRequest, FromRequestParts};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::error::{AppError, FieldError};

/// `Json` whose rejection is an `AppError` body instead of plain text.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Payload<T>(pub T);

/// `Path` whose rejection is an `AppError` body instead of plain text.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct IdPath<T>(pub T);

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Collects field errors so a client sees every problem at once.
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &'static str, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
        self
    }

    pub fn required(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, format!("{field} is required"));
        }
        self
    }

    pub fn max_len(&mut self, field: &'static str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.fail(field, format!("{field} cannot exceed {max} characters"));
        }
        self
    }

    pub fn max_len_opt(
        &mut self,
        field: &'static str,
        value: Option<&str>,
        max: usize,
    ) -> &mut Self {
        if let Some(v) = value {
            self.max_len(field, v, max);
        }
        self
    }

    /// Non-empty values must look like an email; empties are left to `required`.
    pub fn email(&mut self, field: &'static str, value: &str) -> &mut Self {
        if !value.trim().is_empty() && !is_valid_email(value.trim()) {
            self.fail(field, format!("{field} is not a valid email"));
        }
        self
    }

    pub fn min_len(&mut self, field: &'static str, value: &str, min: usize) -> &mut Self {
        if !value.is_empty() && value.chars().count() < min {
            self.fail(field, format!("{field} must be at least {min} characters"));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

/// Trims an optional text field and drops it when blank.
pub(crate) fn clean_opt(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// For `#[serde(default, deserialize_with = "present")]` on `Option<Option<T>>`:
/// a missing key stays `None`, an explicit `null` becomes `Some(None)`.
pub(crate) fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Like `clean_opt` for a clearable field: a blank string clears it.
pub(crate) fn clean_clearable(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(clean_opt)
}
