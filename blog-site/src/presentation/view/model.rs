//! View-model builders. Each page gets a flat JSON object keyed by the
//! names its template reads.

use chrono::{DateTime, Local, Utc};
use serde_json::{Map, Value, json};

use crate::domain::post::Post;

pub(crate) type ViewModel = Map<String, Value>;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) const INDEX_PAGE_TITLE: &str = "Posts";
pub(crate) const CREATE_PAGE_TITLE: &str = "New post";
pub(crate) const EDIT_PAGE_TITLE: &str = "Edit post";

/// Formats in the server's local time zone.
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(DATE_FORMAT).to_string()
}

pub(crate) fn index_model(posts: &[Post]) -> ViewModel {
    let posts: Vec<Value> = posts
        .iter()
        .map(|post| {
            json!({
                "ID": post.id,
                "Title": post.title,
                "Author": post.author,
                "CreatedAt": format_timestamp(post.created_at),
            })
        })
        .collect();

    into_model(json!({
        "PageTitle": INDEX_PAGE_TITLE,
        "Posts": posts,
    }))
}

pub(crate) fn post_model(post: &Post) -> ViewModel {
    into_model(json!({
        "PageTitle": post.title,
        "ID": post.id,
        "Title": post.title,
        "Body": post.body,
        "Author": post.author,
        "CreatedAt": format_timestamp(post.created_at),
    }))
}

pub(crate) fn create_form_model() -> ViewModel {
    into_model(json!({ "PageTitle": CREATE_PAGE_TITLE }))
}

pub(crate) fn edit_form_model(post: &Post) -> ViewModel {
    into_model(json!({
        "PageTitle": EDIT_PAGE_TITLE,
        "ID": post.id,
        "Title": post.title,
        "Body": post.body,
        "Author": post.author,
    }))
}

/// Submitted values are not echoed back; the form comes back empty.
pub(crate) fn invalid_create_model(field: &str) -> ViewModel {
    into_model(json!({
        "PageTitle": CREATE_PAGE_TITLE,
        "Message": empty_field_message(field),
    }))
}

pub(crate) fn invalid_edit_model(id: i64, field: &str) -> ViewModel {
    into_model(json!({
        "PageTitle": EDIT_PAGE_TITLE,
        "ID": id,
        "Message": empty_field_message(field),
    }))
}

fn empty_field_message(field: &str) -> String {
    format!("The form has an empty field: {field}")
}

fn into_model(value: Value) -> ViewModel {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
