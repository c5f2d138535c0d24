use std::sync::Arc;

use anyhow::{Context, Result};

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::blog_service::BlogService;
use data::repositories::sqlite::post_repository::SqlitePostRepository;
use infrastructure::database::create_pool;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;
use presentation::view::renderer::MaudRenderer;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;

    let blog_service = Arc::new(BlogService::new(Arc::new(SqlitePostRepository::new(
        pool.clone(),
    ))));
    let served = async {
        blog_service
            .init_storage()
            .await
            .context("failed to create posts table")?;

        let state = AppState::new(blog_service, Arc::new(MaudRenderer));
        server::run_http(&settings, state).await
    }
    .await;

    pool.close().await;
    served
}
