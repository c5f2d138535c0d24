use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) author: String,
    pub(crate) created_at: DateTime<Utc>,
}

/// Full overwrite of the mutable columns of a post.
#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) author: String,
    pub(crate) created_at: DateTime<Utc>,
}

/// Storage gateway for the `posts` table.
///
/// Every call is its own atomic unit; nothing spans more than one statement.
/// `update_post` and `delete_post` succeed when no row matches the id.
#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_table_if_absent(&self) -> Result<(), DomainError>;
    async fn insert_post(&self, input: NewPost) -> Result<i64, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    /// Row order is whatever the storage engine returns.
    async fn list_posts(&self) -> Result<Vec<Post>, DomainError>;
    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<(), DomainError>;
    async fn delete_post(&self, id: i64) -> Result<(), DomainError>;
}

pub(crate) type SharedPostRepository = Arc<dyn PostRepository>;
