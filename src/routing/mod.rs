//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     Muxer::handle(method, pattern, handler)
//!     → pattern.rs (parse literal / :param / subtree segments)
//!     → router.rs (exact map, sorted param list, sorted subtree list)
//!     → Muxer::build() freezes everything into an immutable Dispatcher
//!
//! Incoming Request (method, path)
//!     → router.rs (reject `*`, redirect non-canonical paths)
//!     → pattern.rs (percent-decode the path segment by segment)
//!     → candidates in precedence order: exact → params → subtrees
//!     → first candidate with a handler for the method wins
//!     → params.rs (captured values placed in request extensions)
//!     → Return: handler response, 405 with Allow, or 404
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - Invalid or duplicate registrations are errors, never panics

pub mod params;
pub mod path;
pub mod pattern;
pub mod router;

pub use params::Params;
pub use path::PathId;
pub use pattern::{decode_path, Pattern, PatternKind};
pub use router::{clean_path, BoxHandler, Dispatcher, Lookup, Muxer};

use axum::http::Method;

/// Errors raised while registering routes.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },

    #[error("duplicate route: {method} {pattern}")]
    Duplicate { method: Method, pattern: String },
}
