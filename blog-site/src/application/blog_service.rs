use chrono::{DateTime, Utc};
use tracing::info;

use crate::data::post_repository::{NewPost, PostPatch, SharedPostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDraft};

pub(crate) struct BlogService {
    repo: SharedPostRepository,
    clock: fn() -> DateTime<Utc>,
}

impl BlogService {
    pub(crate) fn new(repo: SharedPostRepository) -> Self {
        Self::with_clock(repo, Utc::now)
    }

    pub(crate) fn with_clock(repo: SharedPostRepository, clock: fn() -> DateTime<Utc>) -> Self {
        Self { repo, clock }
    }

    pub(crate) async fn init_storage(&self) -> Result<(), DomainError> {
        self.repo.create_table_if_absent().await
    }

    /// Validates the draft and stores it stamped with the current time.
    /// Returns the id assigned by storage.
    pub(crate) async fn create_post(&self, draft: PostDraft) -> Result<i64, DomainError> {
        let draft = draft.validate()?;

        let new_post = NewPost {
            title: draft.title,
            body: draft.body,
            author: draft.author,
            created_at: (self.clock)(),
        };
        let id = self.repo.insert_post(new_post).await?;
        info!(post_id = id, "post created");
        Ok(id)
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.repo
            .get_post(id)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {id}")))
    }

    pub(crate) async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.repo.list_posts().await
    }

    /// Overwrites title, body and author, and resets `created_at` to now.
    /// An id with no row is left alone and reported as success.
    pub(crate) async fn update_post(&self, id: i64, draft: PostDraft) -> Result<(), DomainError> {
        let draft = draft.validate()?;

        let patch = PostPatch {
            title: draft.title,
            body: draft.body,
            author: draft.author,
            created_at: (self.clock)(),
        };
        self.repo.update_post(id, patch).await?;
        info!(post_id = id, "post updated");
        Ok(())
    }

    pub(crate) async fn delete_post(&self, id: i64) -> Result<(), DomainError> {
        self.repo.delete_post(id).await?;
        info!(post_id = id, "post deleted");
        Ok(())
    }
}
