//! HTML template cache.
//!
//! # Data Flow
//! ```text
//! base glob + extra globs
//!     → cache.rs (glob expansion, one Handlebars template per file name)
//!     → ArcSwap<Handlebars> read by every render
//!
//! On change (when templates.watch is set):
//!     watcher.rs sees a modify/create/remove in a template directory
//!     → TemplateCache::reload() builds a fresh registry
//!     → atomic swap; failed reloads keep the previous registry
//! ```

pub mod cache;
pub mod watcher;

use std::path::PathBuf;

pub use cache::{file_has_changed, HelperFn, TemplateCache};
pub use watcher::TemplateWatcher;

/// Errors raised while loading or rendering templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("invalid glob {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("unreadable glob entry: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("pattern {0:?} matched no templates")]
    NoMatches(String),

    #[error("template path {0:?} has no UTF-8 file name")]
    InvalidName(PathBuf),

    #[error("failed to parse template {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    #[error("failed to render template {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },
}
