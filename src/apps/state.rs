//! Shared state handed to every app handler.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::apps::user::UserService;
use crate::apps::widgets::WidgetCatalog;
use crate::sessions::{AuthUser, SessionStore};
use crate::templates::TemplateCache;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub widgets: Arc<WidgetCatalog>,
    pub sessions: SessionStore,
    pub auth: Arc<dyn AuthUser>,
    /// `None` when no template glob is configured.
    pub templates: Option<Arc<TemplateCache>>,
}

impl AppState {
    /// The cache, if it defines `name`.
    pub fn template(&self, name: &str) -> Option<&TemplateCache> {
        self.templates
            .as_deref()
            .filter(|cache| cache.has_template(name))
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
