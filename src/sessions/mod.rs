//! Cookie-based sessions and basic accounts.
//!
//! # Data Flow
//! ```text
//! Request Cookie header
//!     → cookie.rs (find name, base64-decode id)
//!     → store.rs (DashMap lookup, expiry check)
//!     → handler reads/updates the Session copy
//!     → store.save() → SetCookie response part
//! ```
//!
//! # Design Decisions
//! - Session ids are random letters; the cookie value is their base64 form
//! - Expiry is refreshed on every save
//! - A background task collects expired sessions every `timeout / 2`

pub mod auth;
pub mod cookie;
pub mod store;

pub use auth::{AuthUser, BasicAuthUser, SystemUser};
pub use cookie::SetCookie;
pub use store::{CurrentSession, Session, SessionStore};

/// Errors raised while encoding or decoding session cookies.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("cookie value is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("cookie value is not valid UTF-8")]
    InvalidCookie,

    #[error("cookie is not a valid header value: {0}")]
    InvalidHeader(#[from] axum::http::header::InvalidHeaderValue),
}
