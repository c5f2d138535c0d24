use axum::Router;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::{
    create_post, delete_post, edit_post_form, list_posts, new_post_form, show_post, update_post,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        // Static `/post/new` wins over `/post/{id}`.
        .route("/post/new", get(new_post_form).post(create_post))
        .route("/post/{id}", get(show_post))
        .route("/post/edit/{id}", get(edit_post_form).post(update_post))
        .route("/post/delete/{id}", post(delete_post))
}
