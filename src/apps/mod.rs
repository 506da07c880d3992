//! Demo applications served by the muxer.
//!
//! # Responsibilities
//! - User registration CRUD (memory or sqlite backed)
//! - Widget catalog exercising overlapping patterns
//! - Login, logout and a session-protected page
//! - Mount static files, error pages and the route index
//!
//! # Design Decisions
//! - Handlers return `Result<_, AppError>`; the error decides the status
//! - Every app registers onto one `Muxer<AppState>` through a `routes` fn

use axum::http::StatusCode;

use crate::config::MuxerConfig;
use crate::http::response::{error_page, not_found_page};
use crate::routing::{Dispatcher, Muxer, RouteError};

pub mod account;
pub mod error;
pub mod state;
pub mod user;
pub mod widgets;

pub use error::{AppError, ServiceError};
pub use state::AppState;
pub use widgets::WidgetCatalog;

/// Register every app plus the configured muxer features.
pub fn build_muxer(config: &MuxerConfig, state: AppState) -> Result<Dispatcher, RouteError> {
    let mut mux = Muxer::new(state).log_requests(config.log_requests);

    if let Some(dir) = &config.static_dir {
        mux.static_dir(&config.static_prefix, dir)?;
    }
    if config.error_pages {
        mux.get("/error/", error_page)?;
        mux.not_found(not_found_page);
    }
    if let Some(path) = &config.route_index {
        mux.route_index(path);
    }

    widgets::routes(&mut mux)?;
    user::routes(&mut mux)?;
    account::routes(&mut mux)?;
    mux.forward("/register", "/user")?;
    mux.get("/favicon.ico", || async { StatusCode::NO_CONTENT })?;

    mux.build()
}
