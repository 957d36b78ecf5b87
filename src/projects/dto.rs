use serde::Deserialize;

use super::repo::{Category, NewProject, ProjectPatch};
use crate::{
    error::AppError,
    validation::{clean_clearable, present, Checks},
};

pub const MAX_TITLE: usize = 100;
pub const MAX_DESCRIPTION: usize = 1000;
pub const MAX_TECHNOLOGIES: usize = 200;
pub const MAX_URL: usize = 500;

/// Body of `POST /projects` and `PUT /projects/:id`.
///
/// The links distinguish a missing key (keep) from `null` or `""` (clear).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub github_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub live_url: Option<Option<String>>,
    pub category: Option<Category>,
}

fn set(v: &Option<Option<String>>) -> Option<&str> {
    v.as_ref().and_then(Option::as_deref)
}

impl ProjectBody {
    fn trimmed(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        Self {
            title: trim(self.title),
            description: trim(self.description),
            technologies: trim(self.technologies),
            image_url: clean_clearable(self.image_url),
            github_url: clean_clearable(self.github_url),
            live_url: clean_clearable(self.live_url),
            category: self.category,
        }
    }

    fn check_lengths(&self, checks: &mut Checks) {
        checks
            .max_len_opt("title", self.title.as_deref(), MAX_TITLE)
            .max_len_opt("description", self.description.as_deref(), MAX_DESCRIPTION)
            .max_len_opt("technologies", self.technologies.as_deref(), MAX_TECHNOLOGIES)
            .max_len_opt("imageUrl", set(&self.image_url), MAX_URL)
            .max_len_opt("githubUrl", set(&self.github_url), MAX_URL)
            .max_len_opt("liveUrl", set(&self.live_url), MAX_URL);
    }

    pub fn into_new(self) -> Result<NewProject, AppError> {
        let body = self.trimmed();
        let mut checks = Checks::new();
        checks
            .required("title", body.title.as_deref().unwrap_or_default())
            .required("description", body.description.as_deref().unwrap_or_default())
            .required("technologies", body.technologies.as_deref().unwrap_or_default());
        body.check_lengths(&mut checks);
        checks.finish()?;

        Ok(NewProject {
            title: body.title.unwrap_or_default(),
            description: body.description.unwrap_or_default(),
            technologies: body.technologies.unwrap_or_default(),
            image_url: body.image_url.flatten(),
            github_url: body.github_url.flatten(),
            live_url: body.live_url.flatten(),
            category: body.category.unwrap_or_default(),
        })
    }

    /// Fields that are present must still be valid; required ones cannot be blanked.
    pub fn into_patch(self) -> Result<ProjectPatch, AppError> {
        let body = self.trimmed();
        let mut checks = Checks::new();
        for (field, value) in [
            ("title", &body.title),
            ("description", &body.description),
            ("technologies", &body.technologies),
        ] {
            if let Some(v) = value {
                checks.required(field, v);
            }
        }
        body.check_lengths(&mut checks);
        checks.finish()?;

        Ok(ProjectPatch {
            title: body.title,
            description: body.description,
            technologies: body.technologies,
            image_url: body.image_url,
            github_url: body.github_url,
            live_url: body.live_url,
            category: body.category,
        })
    }
}
