use async_trait::async_trait;
use chrono::DateTime;
use sqlx::SqlitePool;

use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct SqlitePostRepository {
    pool: SqlitePool,
}

impl SqlitePostRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    body: String,
    author: String,
    created_at: i64,
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn create_table_if_absent(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT,
                body TEXT,
                author TEXT,
                created_at INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(())
    }

    async fn insert_post(&self, input: NewPost) -> Result<i64, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (title, body, author, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(input.title)
        .bind(input.body)
        .bind(input.author)
        .bind(input.created_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, body, author, created_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, body, author, created_at
            FROM posts
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE posts
            SET title = ?,
                body = ?,
                author = ?,
                created_at = ?
            WHERE id = ?
            "#,
        )
        .bind(patch.title)
        .bind(patch.body)
        .bind(patch.author)
        .bind(patch.created_at.timestamp())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(())
    }

    async fn delete_post(&self, id: i64) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(())
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let created_at = DateTime::from_timestamp(row.created_at, 0).ok_or_else(|| {
        DomainError::Storage(format!(
            "post {} has out-of-range created_at {}",
            row.id, row.created_at
        ))
    })?;

    Post::new(row.id, row.title, row.body, row.author, created_at)
        .map_err(|err| DomainError::Storage(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    DomainError::Storage(err.to_string())
}
