use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::infrastructure::settings::Settings;
use crate::presentation::http::middleware::body_limit::apply_body_limit;
use crate::presentation::http::middleware::trace::apply_trace;
use crate::presentation::{AppState, http_handlers};

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state, settings);

    let listener = TcpListener::bind(&settings.http_addr).await?;

    info!("HTTP server listening on {}", settings.http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub(crate) fn build_router(state: AppState, settings: &Settings) -> Router {
    let app = http_handlers::routes(state, &settings.static_dir);
    let app = apply_body_limit(app, settings.http_request_body_limit_bytes);
    apply_trace(app)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use chrono::Utc;
    use sqlx::SqlitePool;
    use tokio::task::JoinSet;
    use tower::ServiceExt;

    use super::build_router;
    use crate::application::blog_service::BlogService;
    use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
    use crate::data::repositories::sqlite::post_repository::SqlitePostRepository;
    use crate::domain::error::DomainError;
    use crate::domain::post::Post;
    use crate::infrastructure::database::{create_pool, memory_pool};
    use crate::infrastructure::settings::Settings;
    use crate::presentation::AppState;
    use crate::presentation::view::renderer::MaudRenderer;

    /// Real SQLite storage that counts every gateway call.
    struct CountingRepo {
        inner: SqlitePostRepository,
        calls: Arc<AtomicUsize>,
    }

    impl CountingRepo {
        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl PostRepository for CountingRepo {
        async fn create_table_if_absent(&self) -> Result<(), DomainError> {
            self.hit();
            self.inner.create_table_if_absent().await
        }

        async fn insert_post(&self, input: NewPost) -> Result<i64, DomainError> {
            self.hit();
            self.inner.insert_post(input).await
        }

        async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
            self.hit();
            self.inner.get_post(id).await
        }

        async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
            self.hit();
            self.inner.list_posts().await
        }

        async fn update_post(&self, id: i64, patch: PostPatch) -> Result<(), DomainError> {
            self.hit();
            self.inner.update_post(id, patch).await
        }

        async fn delete_post(&self, id: i64) -> Result<(), DomainError> {
            self.hit();
            self.inner.delete_post(id).await
        }
    }

    struct TestApp {
        router: Router,
        service: Arc<BlogService>,
        storage_calls: Arc<AtomicUsize>,
    }

    fn test_settings() -> Settings {
        Settings {
            http_addr: "127.0.0.1:0".to_string(),
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public"),
            log_level: "info".to_string(),
            http_request_body_limit_bytes: 1024 * 1024,
        }
    }

    async fn app_with_schema(create_schema: bool) -> TestApp {
        build_app(memory_pool().await, test_settings(), create_schema).await
    }

    async fn build_app(pool: SqlitePool, settings: Settings, create_schema: bool) -> TestApp {
        let storage_calls = Arc::new(AtomicUsize::new(0));
        let repo = CountingRepo {
            inner: SqlitePostRepository::new(pool),
            calls: storage_calls.clone(),
        };
        let service = Arc::new(BlogService::new(Arc::new(repo)));
        if create_schema {
            service.init_storage().await.expect("schema must be created");
        }
        storage_calls.store(0, Ordering::SeqCst);

        let state = AppState::new(service.clone(), Arc::new(MaudRenderer));
        TestApp {
            router: build_router(state, &settings),
            service,
            storage_calls,
        }
    }

    async fn app() -> TestApp {
        app_with_schema(true).await
    }

    impl TestApp {
        async fn send(&self, request: Request<Body>) -> Response {
            self.router
                .clone()
                .oneshot(request)
                .await
                .expect("router is infallible")
        }

        async fn get(&self, uri: &str) -> Response {
            self.send(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("valid request"),
            )
            .await
        }

        async fn post_form(&self, uri: &str, form: &str) -> Response {
            self.send(form_request(uri, form)).await
        }

        fn storage_calls(&self) -> usize {
            self.storage_calls.load(Ordering::SeqCst)
        }
    }

    fn form_request(uri: &str, form: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::CONTENT_LENGTH, form.len())
            .body(Body::from(form.to_string()))
            .expect("valid request")
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body must be readable");
        String::from_utf8(bytes.to_vec()).expect("body must be utf-8")
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .expect("redirect must carry Location")
            .to_str()
            .expect("Location must be ascii")
    }

    #[tokio::test]
    async fn create_then_read_on_fresh_store() {
        let app = app().await;
        let before = Utc::now().timestamp();

        let response = app
            .post_form("/post/new", "title=Hello&body=World&author=Alice")
            .await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(location(&response), "/post/1");

        let response = app.get("/post/1").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<title>Hello</title>"));
        assert!(html.contains("World"));
        assert!(html.contains("Alice"));

        let post = app.service.get_post(1).await.expect("post must exist");
        let after = Utc::now().timestamp();
        assert!((before..=after).contains(&post.created_at.timestamp()));
    }

    #[tokio::test]
    async fn new_post_form_renders() {
        let app = app().await;

        let response = app.get("/post/new").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"action="/post/new""#));
        assert_eq!(app.storage_calls(), 0);
    }

    #[tokio::test]
    async fn index_lists_every_created_post() {
        let app = app().await;

        let html = body_text(app.get("/").await).await;
        assert!(html.contains("No posts yet."));

        for title in ["one", "two", "three"] {
            let response = app
                .post_form("/post/new", &format!("title={title}&body=b&author=a"))
                .await;
            assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        }

        let response = app.get("/").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        for id in 1..=3 {
            assert!(html.contains(&format!(r#"href="/post/{id}""#)));
        }
        assert_eq!(app.service.list_posts().await.expect("list").len(), 3);
    }

    #[tokio::test]
    async fn create_with_empty_field_rerenders_form_without_writing() {
        let app = app().await;

        let response = app
            .post_form("/post/new", "title=Hello&body=World&author=")
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("empty field: author"));
        assert!(!html.contains(r#"value="Hello""#));

        let response = app.post_form("/post/new", "title=Hello").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert!(app.service.list_posts().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn malformed_ids_never_reach_storage() {
        let app = app().await;

        let cases = [
            app.get("/post/abc").await,
            app.get("/post/edit/abc").await,
            app.post_form("/post/edit/abc", "title=a&body=b&author=c")
                .await,
            app.post_form("/post/delete/abc", "").await,
        ];

        for response in cases {
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
        assert_eq!(app.storage_calls(), 0);
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let app = app().await;

        assert_eq!(app.get("/post/99").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            app.get("/post/edit/99").await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn edit_form_is_prefilled_and_update_overwrites() {
        let app = app().await;
        app.post_form("/post/new", "title=Old&body=Text&author=Alice")
            .await;

        let html = body_text(app.get("/post/edit/1").await).await;
        assert!(html.contains(r#"value="Old""#));
        assert!(html.contains(r#"action="/post/edit/1""#));

        let response = app
            .post_form("/post/edit/1", "title=New&body=Changed&author=Bob")
            .await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(location(&response), "/post/1");

        let post = app.service.get_post(1).await.expect("post must exist");
        assert_eq!(post.id, 1);
        assert_eq!(post.title, "New");
        assert_eq!(post.body, "Changed");
        assert_eq!(post.author, "Bob");
    }

    #[tokio::test]
    async fn edit_with_empty_field_keeps_stored_values() {
        let app = app().await;
        app.post_form("/post/new", "title=Keep&body=Me&author=Alice")
            .await;

        let response = app
            .post_form("/post/edit/1", "title=&body=Me&author=Alice")
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("empty field: title"));
        assert!(html.contains(r#"action="/post/edit/1""#));

        let post = app.service.get_post(1).await.expect("post must exist");
        assert_eq!(post.title, "Keep");
    }

    #[tokio::test]
    async fn edit_of_missing_post_creates_nothing() {
        let app = app().await;

        let response = app
            .post_form("/post/edit/5", "title=a&body=b&author=c")
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(app.service.list_posts().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn delete_redirects_home_and_is_idempotent() {
        let app = app().await;
        app.post_form("/post/new", "title=Bye&body=b&author=a").await;

        let response = app.post_form("/post/delete/1", "").await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(location(&response), "/");
        assert_eq!(app.get("/post/1").await.status(), StatusCode::NOT_FOUND);

        let response = app.post_form("/post/delete/1", "").await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    }

    #[tokio::test]
    async fn storage_failure_is_internal_error() {
        let app = app_with_schema(false).await;

        assert_eq!(
            app.get("/").await.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            app.post_form("/post/new", "title=a&body=b&author=c")
                .await
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn serves_stylesheet_and_health() {
        let app = app().await;

        let response = app.get("/css/style.css").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!body_text(response).await.is_empty());

        assert_eq!(
            app.get("/css/missing.css").await.status(),
            StatusCode::NOT_FOUND
        );

        let response = app.get("/healthz").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn delete_requires_post() {
        let app = app().await;
        assert_eq!(
            app.get("/post/delete/1").await.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_before_create() {
        let mut settings = test_settings();
        settings.http_request_body_limit_bytes = 64;
        let app = build_app(memory_pool().await, settings, true).await;

        let form = format!("title={}&body=b&author=a", "x".repeat(500));
        let response = app.post_form("/post/new", &form).await;

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(app.service.list_posts().await.expect("list").is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_all_persist() {
        let path = std::env::temp_dir().join(format!(
            "blog-site-concurrent-{}-{}.sqlite3",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let database_url = format!("sqlite://{}", path.display());
        let pool = create_pool(&database_url, 5)
            .await
            .expect("file-backed pool must open");

        let mut settings = test_settings();
        settings.database_url = database_url;
        settings.database_max_connections = 5;
        let app = build_app(pool.clone(), settings, true).await;

        let mut requests = JoinSet::new();
        for n in 0..50 {
            let router = app.router.clone();
            requests.spawn(async move {
                router
                    .oneshot(form_request(
                        "/post/new",
                        &format!("title=t{n}&body=b&author=a"),
                    ))
                    .await
                    .expect("router is infallible")
                    .status()
            });
        }
        while let Some(status) = requests.join_next().await {
            assert_eq!(
                status.expect("request task must not panic"),
                StatusCode::MOVED_PERMANENTLY
            );
        }

        let posts = app.service.list_posts().await.expect("list");
        let ids: BTreeSet<i64> = posts.iter().map(|post| post.id).collect();
        assert_eq!(posts.len(), 50);
        assert_eq!(ids.len(), 50);

        pool.close().await;
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }
}
