use chrono::{DateTime, Utc};
use validator::Validate;

use super::error::DomainError;

/// A stored blog post. `id` is assigned by storage and never changes.
#[derive(Debug, Clone)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) author: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl Post {
    pub(crate) fn new(
        id: i64,
        title: impl Into<String>,
        body: impl Into<String>,
        author: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }

        Ok(Self {
            id,
            title: title.into(),
            body: body.into(),
            author: author.into(),
            created_at,
        })
    }
}

/// User-submitted fields shared by create and edit.
///
/// Only presence is checked: values are not trimmed, so a title made of
/// spaces is accepted.
#[derive(Debug, Clone, Validate)]
pub(crate) struct PostDraft {
    #[validate(length(min = 1))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) body: String,
    #[validate(length(min = 1))]
    pub(crate) author: String,
}

const REQUIRED_FIELDS: [&str; 3] = ["title", "body", "author"];

impl PostDraft {
    pub(crate) fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            author: author.into(),
        }
    }

    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if let Err(errors) = Validate::validate(&self) {
            let failed = errors.errors();
            let field = REQUIRED_FIELDS
                .into_iter()
                .find(|field| failed.contains_key(*field))
                .unwrap_or("post");

            return Err(DomainError::Validation {
                field,
                message: "must not be empty",
            });
        }
        Ok(self)
    }
}
