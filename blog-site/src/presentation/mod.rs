use std::sync::Arc;

use crate::application::blog_service::BlogService;
use crate::presentation::view::renderer::Renderer;

pub(crate) mod http;
pub(crate) mod http_handlers;
pub(crate) mod view;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) blog_service: Arc<BlogService>,
    pub(crate) renderer: Arc<dyn Renderer>,
}

impl AppState {
    pub(crate) fn new(blog_service: Arc<BlogService>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            blog_service,
            renderer,
        }
    }
}
