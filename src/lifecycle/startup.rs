//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the configured storage backend for the user app
//! - Seed the basic auth accounts
//! - Load the template cache when a glob is configured
//! - Register every app and freeze the muxer
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Background tasks (session GC, template watcher) are started by the
//!   caller, which owns the shutdown coordinator

use std::sync::Arc;

use crate::apps::user::{wire_user, User};
use crate::apps::{build_muxer, AppState, WidgetCatalog};
use crate::config::{AppConfig, Backend, DatabaseConfig, TemplateConfig};
use crate::routing::{Dispatcher, RouteError};
use crate::sessions::{AuthUser, BasicAuthUser, SessionStore};
use crate::storage::{Dao, MemoryDataSource, SqliteDataSource, StorageError};
use crate::templates::{TemplateCache, TemplateError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error("templates: {0}")]
    Template(#[from] TemplateError),

    #[error("routes: {0}")]
    Route(#[from] RouteError),

    #[error("sqlite backend selected without database.sqlite_path")]
    MissingSqlitePath,
}

/// Data source backing the user app.
pub fn open_user_store(config: &DatabaseConfig) -> Result<Arc<dyn Dao<User>>, StartupError> {
    match config.backend {
        Backend::Memory => {
            tracing::info!("Using in-memory user store");
            Ok(Arc::new(MemoryDataSource::<User>::new()))
        }
        Backend::Sqlite => {
            let path = config
                .sqlite_path
                .as_ref()
                .ok_or(StartupError::MissingSqlitePath)?;
            tracing::info!(path = %path.display(), "Using sqlite user store");
            Ok(Arc::new(SqliteDataSource::<User>::open(path)?))
        }
    }
}

/// Template cache for the configured globs, if any.
pub fn load_templates(config: &TemplateConfig) -> Result<Option<Arc<TemplateCache>>, StartupError> {
    let Some(base) = &config.base_pattern else {
        return Ok(None);
    };
    let cache = TemplateCache::new(base)?;
    for pattern in &config.extra_patterns {
        let count = cache.parse_glob(pattern)?;
        tracing::debug!(pattern = %pattern, templates = count, "Extra templates loaded");
    }
    tracing::info!(templates = cache.defined_templates().len(), "Template cache ready");
    Ok(Some(Arc::new(cache)))
}

/// Build the shared state and the dispatcher for `config`.
pub fn build_app(config: &AppConfig) -> Result<(AppState, Dispatcher), StartupError> {
    let auth = BasicAuthUser::new();
    for account in &config.auth.accounts {
        auth.register(&account.username, &account.password, &account.role);
    }
    tracing::info!(accounts = auth.len(), "Auth accounts seeded");

    let state = AppState {
        users: Arc::new(wire_user(open_user_store(&config.database)?)),
        widgets: Arc::new(WidgetCatalog::new()),
        sessions: SessionStore::from_config(&config.sessions),
        auth: Arc::new(auth),
        templates: load_templates(&config.templates)?,
    };

    let dispatcher = build_muxer(&config.muxer, state.clone())?;
    tracing::info!(routes = dispatcher.entries().len(), "Muxer ready");
    Ok((state, dispatcher))
}
