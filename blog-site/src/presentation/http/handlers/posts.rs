use axum::{
    Form,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::warn;

use crate::domain::error::DomainError;
use crate::domain::post::PostDraft;
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppError, AppResult};
use crate::presentation::view::model::{
    ViewModel, create_form_model, edit_form_model, index_model, invalid_create_model,
    invalid_edit_model, post_model,
};
use crate::presentation::view::renderer::Template;

/// Form body of the create and edit pages. Absent fields arrive as empty
/// strings so they fail presence validation instead of extraction.
#[derive(Debug, Deserialize)]
pub(crate) struct PostFormDto {
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) body: String,
    #[serde(default)]
    pub(crate) author: String,
}

impl From<PostFormDto> for PostDraft {
    fn from(dto: PostFormDto) -> Self {
        PostDraft::new(dto.title, dto.body, dto.author)
    }
}

pub(crate) async fn list_posts(State(state): State<AppState>) -> AppResult<Html<String>> {
    let posts = state.blog_service.list_posts().await?;
    render_page(&state, Template::Index, &index_model(&posts))
}

pub(crate) async fn show_post(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Html<String>> {
    let id = parse_post_id(&raw_id)?;
    let post = state.blog_service.get_post(id).await?;
    render_page(&state, Template::Post, &post_model(&post))
}

pub(crate) async fn new_post_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    render_page(&state, Template::Create, &create_form_model())
}

pub(crate) async fn create_post(
    State(state): State<AppState>,
    Form(dto): Form<PostFormDto>,
) -> AppResult<Response> {
    match state.blog_service.create_post(dto.into()).await {
        Ok(id) => Ok(redirect_permanent(format!("/post/{id}"))),
        Err(DomainError::Validation { field, .. }) => {
            warn!(field, "create rejected: empty field");
            render_invalid_form(&state, Template::Create, &invalid_create_model(field))
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn edit_post_form(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Html<String>> {
    let id = parse_post_id(&raw_id)?;
    let post = state.blog_service.get_post(id).await?;
    render_page(&state, Template::Edit, &edit_form_model(&post))
}

pub(crate) async fn update_post(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Form(dto): Form<PostFormDto>,
) -> AppResult<Response> {
    let id = parse_post_id(&raw_id)?;
    // The post must exist before an edit is accepted.
    state.blog_service.get_post(id).await?;

    match state.blog_service.update_post(id, dto.into()).await {
        Ok(()) => Ok(redirect_permanent(format!("/post/{id}"))),
        Err(DomainError::Validation { field, .. }) => {
            warn!(post_id = id, field, "edit rejected: empty field");
            render_invalid_form(&state, Template::Edit, &invalid_edit_model(id, field))
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn delete_post(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let id = parse_post_id(&raw_id)?;
    state.blog_service.delete_post(id).await?;
    Ok(redirect_permanent("/".to_string()))
}

/// Base-10 id from the last path segment. Runs before any storage call.
fn parse_post_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| AppError::MalformedId(raw.to_string()))
}

fn render_page(state: &AppState, template: Template, model: &ViewModel) -> AppResult<Html<String>> {
    let html = state.renderer.render(template, model)?;
    Ok(Html(html))
}

fn render_invalid_form(
    state: &AppState,
    template: Template,
    model: &ViewModel,
) -> AppResult<Response> {
    let page = render_page(state, template, model)?;
    Ok((StatusCode::BAD_REQUEST, page).into_response())
}

fn redirect_permanent(location: String) -> Response {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}
