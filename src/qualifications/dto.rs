use serde::{Deserialize, Deserializer};
use time::Date;

use super::repo::{iso_date, NewQualification, QualificationKind, QualificationPatch};
use crate::{
    error::AppError,
    validation::{clean_clearable, present, Checks},
};

pub const MAX_DEGREE: usize = 100;
pub const MAX_INSTITUTION: usize = 200;
pub const MAX_FIELD: usize = 100;
pub const MAX_DESCRIPTION: usize = 1000;
pub const MAX_GRADE: usize = 50;

/// Body of `POST /qualifications` and `PUT /qualifications/:id`. Dates are `YYYY-MM-DD`.
///
/// `endDate`, `description` and `grade` can be cleared with `null` (or `""` for text).
/// A cleared `endDate` means the qualification is still in progress.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualificationBody {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub field: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub start_date: Option<Date>,
    #[serde(default, deserialize_with = "present_date")]
    pub end_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub grade: Option<Option<String>>,
    #[serde(rename = "type")]
    pub kind: Option<QualificationKind>,
}

fn present_date<'de, D>(de: D) -> Result<Option<Option<Date>>, D::Error>
where
    D: Deserializer<'de>,
{
    iso_date::option::deserialize(de).map(Some)
}

fn set(v: &Option<Option<String>>) -> Option<&str> {
    v.as_ref().and_then(Option::as_deref)
}

pub(crate) fn end_before_start(start: Date, end: Option<Date>) -> bool {
    end.is_some_and(|end| end < start)
}

pub(crate) const END_BEFORE_START: &str = "endDate cannot be before startDate";

impl QualificationBody {
    fn trimmed(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        Self {
            degree: trim(self.degree),
            institution: trim(self.institution),
            field: trim(self.field),
            description: clean_clearable(self.description),
            grade: clean_clearable(self.grade),
            ..self
        }
    }

    fn check_common(&self, checks: &mut Checks) {
        checks
            .max_len_opt("degree", self.degree.as_deref(), MAX_DEGREE)
            .max_len_opt("institution", self.institution.as_deref(), MAX_INSTITUTION)
            .max_len_opt("field", self.field.as_deref(), MAX_FIELD)
            .max_len_opt("description", set(&self.description), MAX_DESCRIPTION)
            .max_len_opt("grade", set(&self.grade), MAX_GRADE);
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end_before_start(start, end) {
                checks.fail("endDate", END_BEFORE_START);
            }
        }
    }

    pub fn into_new(self) -> Result<NewQualification, AppError> {
        let body = self.trimmed();
        let mut checks = Checks::new();
        checks
            .required("degree", body.degree.as_deref().unwrap_or_default())
            .required("institution", body.institution.as_deref().unwrap_or_default())
            .required("field", body.field.as_deref().unwrap_or_default());
        if body.start_date.is_none() {
            checks.fail("startDate", "startDate is required");
        }
        body.check_common(&mut checks);
        checks.finish()?;

        let start_date = body
            .start_date
            .ok_or_else(|| AppError::Validation(Vec::new()))?;
        Ok(NewQualification {
            degree: body.degree.unwrap_or_default(),
            institution: body.institution.unwrap_or_default(),
            field: body.field.unwrap_or_default(),
            start_date,
            end_date: body.end_date.flatten(),
            description: body.description.flatten(),
            grade: body.grade.flatten(),
            kind: body.kind.unwrap_or_default(),
        })
    }

    pub fn into_patch(self) -> Result<QualificationPatch, AppError> {
        let body = self.trimmed();
        let mut checks = Checks::new();
        for (field, value) in [
            ("degree", &body.degree),
            ("institution", &body.institution),
            ("field", &body.field),
        ] {
            if let Some(v) = value {
                checks.required(field, v);
            }
        }
        body.check_common(&mut checks);
        checks.finish()?;

        Ok(QualificationPatch {
            degree: body.degree,
            institution: body.institution,
            field: body.field,
            start_date: body.start_date,
            end_date: body.end_date,
            description: body.description,
            grade: body.grade,
            kind: body.kind,
        })
    }
}
