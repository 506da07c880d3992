//! Small web-application toolkit: a request muxer with pattern routing,
//! cookie sessions, a template cache, a tag-to-SQL generator and demo
//! CRUD apps wired through repository, service and controller layers.

pub mod apps;
pub mod config;
pub mod forms;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod sessions;
pub mod sorm;
pub mod storage;
pub mod templates;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Dispatcher, Muxer};
