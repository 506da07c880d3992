//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the web
//! application. All types derive Serde traits for deserialization from
//! config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the web application.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Name used in log lines.
    pub app_name: String,

    /// Drain in-flight requests on shutdown instead of dropping them.
    pub graceful_shutdown: bool,

    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Muxer features: static files, error pages, route index.
    pub muxer: MuxerConfig,

    /// Session cookie settings.
    pub sessions: SessionConfig,

    /// Template cache settings.
    pub templates: TemplateConfig,

    /// Storage backend for the user app.
    pub database: DatabaseConfig,

    /// Accounts seeded into the basic auth store.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "web-ddd".to_string(),
            graceful_shutdown: true,
            listener: ListenerConfig::default(),
            muxer: MuxerConfig::default(),
            sessions: SessionConfig::default(),
            templates: TemplateConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Muxer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MuxerConfig {
    /// Subtree pattern the static files are served under.
    pub static_prefix: String,

    /// Directory holding the static files. `None` disables static serving.
    pub static_dir: Option<PathBuf>,

    /// Mount `/error/<code>` pages and render 404s through them.
    pub error_pages: bool,

    /// Path of the HTML route listing, if any.
    pub route_index: Option<String>,

    /// Log every dispatched request.
    pub log_requests: bool,
}

impl Default for MuxerConfig {
    fn default() -> Self {
        Self {
            static_prefix: "/static/".to_string(),
            static_dir: Some(PathBuf::from("web/static")),
            error_pages: true,
            route_index: None,
            log_requests: true,
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,

    /// Idle lifetime of a session in seconds.
    pub timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "go_sess_id".to_string(),
            timeout_secs: 900,
        }
    }
}

/// Template cache configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Glob of the base templates (e.g., "web/templates/*.html").
    /// `None` runs without templates.
    pub base_pattern: Option<String>,

    /// Further globs parsed after the base.
    pub extra_patterns: Vec<String>,

    /// Reload the cache when a template directory changes.
    pub watch: bool,
}

/// Storage backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Sqlite,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Which data source backs the user app.
    pub backend: Backend,

    /// Database file for the sqlite backend.
    pub sqlite_path: Option<PathBuf>,
}

/// A seeded account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "user".to_string()
}

/// Basic auth configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub accounts: Vec<AccountConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            accounts: vec![AccountConfig {
                username: "admin".to_string(),
                password: "admin".to_string(),
                role: "admin".to_string(),
            }],
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
