use maud::{DOCTYPE, Markup, html};
use serde_json::{Map, Value};
use thiserror::Error;

use super::model::ViewModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Template {
    Index,
    Post,
    Create,
    Edit,
}

impl Template {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Template::Index => "index",
            Template::Post => "post",
            Template::Create => "create",
            Template::Edit => "edit",
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum RenderError {
    #[error("template '{template}' requires field '{field}'")]
    MissingField {
        template: &'static str,
        field: &'static str,
    },
}

/// Turns a view model into a full HTML document.
pub(crate) trait Renderer: Send + Sync {
    fn render(&self, template: Template, model: &ViewModel) -> Result<String, RenderError>;
}

/// HTML renderer backed by compile-time `maud` templates. All text coming
/// from the view model is escaped.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MaudRenderer;

impl Renderer for MaudRenderer {
    fn render(&self, template: Template, model: &ViewModel) -> Result<String, RenderError> {
        let fields = Fields { template, model };
        let content = match template {
            Template::Index => index(&fields)?,
            Template::Post => post(&fields)?,
            Template::Create => create(&fields),
            Template::Edit => edit(&fields)?,
        };

        Ok(layout(fields.text("PageTitle"), content).into_string())
    }
}

struct Fields<'a> {
    template: Template,
    model: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn text(&self, key: &str) -> &'a str {
        self.model.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    fn required_id(&self, key: &'static str) -> Result<i64, RenderError> {
        self.model
            .get(key)
            .and_then(Value::as_i64)
            .ok_or_else(|| self.missing(key))
    }

    fn message(&self) -> Option<&'a str> {
        self.model.get("Message").and_then(Value::as_str)
    }

    fn missing(&self, field: &'static str) -> RenderError {
        RenderError::MissingField {
            template: self.template.name(),
            field,
        }
    }
}

fn layout(page_title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (page_title) }
                link rel="stylesheet" href="/css/style.css";
            }
            body {
                header {
                    nav {
                        a href="/" { "Posts" }
                        " | "
                        a href="/post/new" { "New post" }
                    }
                }
                main { (content) }
            }
        }
    }
}

fn index(fields: &Fields<'_>) -> Result<Markup, RenderError> {
    let posts = fields
        .model
        .get("Posts")
        .and_then(Value::as_array)
        .ok_or_else(|| fields.missing("Posts"))?;

    let mut rows = Vec::with_capacity(posts.len());
    for entry in posts {
        let entry = entry
            .as_object()
            .ok_or_else(|| fields.missing("Posts"))?;
        let row = Fields {
            template: fields.template,
            model: entry,
        };
        let id = row.required_id("ID")?;
        rows.push(html! {
            li.post {
                a href=(format!("/post/{id}")) { (row.text("Title")) }
                " "
                span.author { (row.text("Author")) }
                " "
                time { (row.text("CreatedAt")) }
            }
        });
    }

    Ok(html! {
        h1 { (fields.text("PageTitle")) }
        @if rows.is_empty() {
            p { "No posts yet." }
        } @else {
            ul.posts {
                @for row in &rows { (row) }
            }
        }
    })
}

fn post(fields: &Fields<'_>) -> Result<Markup, RenderError> {
    let id = fields.required_id("ID")?;

    Ok(html! {
        article {
            h1 { (fields.text("Title")) }
            p.meta {
                span.author { (fields.text("Author")) }
                " "
                time { (fields.text("CreatedAt")) }
            }
            div.body { (fields.text("Body")) }
        }
        p.actions {
            a href=(format!("/post/edit/{id}")) { "Edit" }
        }
        form method="post" action=(format!("/post/delete/{id}")) {
            button type="submit" { "Delete" }
        }
    })
}

fn create(fields: &Fields<'_>) -> Markup {
    html! {
        h1 { (fields.text("PageTitle")) }
        (post_form(fields, "/post/new", "Create"))
    }
}

fn edit(fields: &Fields<'_>) -> Result<Markup, RenderError> {
    let id = fields.required_id("ID")?;

    Ok(html! {
        h1 { (fields.text("PageTitle")) }
        (post_form(fields, &format!("/post/edit/{id}"), "Save"))
    })
}

fn post_form(fields: &Fields<'_>, action: &str, submit: &str) -> Markup {
    html! {
        @if let Some(message) = fields.message() {
            p.message { (message) }
        }
        form method="post" action=(action) {
            label {
                "Title"
                input type="text" name="title" value=(fields.text("Title"));
            }
            label {
                "Author"
                input type="text" name="author" value=(fields.text("Author"));
            }
            label {
                "Body"
                textarea name="body" { (fields.text("Body")) }
            }
            button type="submit" { (submit) }
        }
    }
}
