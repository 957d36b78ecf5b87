use serde::Deserialize;

use super::repo::{ContactPatch, NewContact};
use crate::{error::AppError, validation::Checks};

pub const MAX_NAME: usize = 100;
pub const MAX_MESSAGE: usize = 2000;

#[derive(Debug, Default, Deserialize)]
pub struct ContactBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ContactBody {
    fn trimmed(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        Self {
            name: trim(self.name),
            email: trim(self.email),
            message: trim(self.message),
        }
    }

    fn check_present(&self, checks: &mut Checks) {
        checks
            .max_len_opt("name", self.name.as_deref(), MAX_NAME)
            .max_len_opt("message", self.message.as_deref(), MAX_MESSAGE);
        if let Some(email) = &self.email {
            checks.email("email", email);
        }
    }

    pub fn into_new(self) -> Result<NewContact, AppError> {
        let body = self.trimmed();
        let mut checks = Checks::new();
        checks
            .required("name", body.name.as_deref().unwrap_or_default())
            .required("email", body.email.as_deref().unwrap_or_default())
            .required("message", body.message.as_deref().unwrap_or_default());
        body.check_present(&mut checks);
        checks.finish()?;

        Ok(NewContact {
            name: body.name.unwrap_or_default(),
            email: body.email.unwrap_or_default(),
            message: body.message.unwrap_or_default(),
        })
    }

    pub fn into_patch(self) -> Result<ContactPatch, AppError> {
        let body = self.trimmed();
        let mut checks = Checks::new();
        for (field, value) in [
            ("name", &body.name),
            ("email", &body.email),
            ("message", &body.message),
        ] {
            if let Some(v) = value {
                checks.required(field, v);
            }
        }
        body.check_present(&mut checks);
        checks.finish()?;

        Ok(ContactPatch {
            name: body.name,
            email: body.email,
            message: body.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_well_formed_message() {
        let c = ContactBody {
            name: Some(" Ann ".into()),
            email: Some("ann@example.com".into()),
            message: Some("Hello".into()),
        }
        .into_new()
        .unwrap();
        assert_eq!(c.name, "Ann");
    }

    #[test]
    fn rejects_bad_email_and_long_message() {
        let err = ContactBody {
            name: Some("Ann".into()),
            email: Some("not-an-email".into()),
            message: Some("x".repeat(MAX_MESSAGE + 1)),
        }
        .into_new()
        .unwrap_err();
        match err {
            AppError::Validation(f) => {
                let fields: Vec<_> = f.iter().map(|e| e.field).collect();
                assert_eq!(fields, vec!["message", "email"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_patch_is_allowed() {
        let patch = ContactBody::default().into_patch().unwrap();
        assert!(patch.name.is_none() && patch.email.is_none() && patch.message.is_none());
    }
}
