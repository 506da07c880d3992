//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, non-empty names)
//! - Check that dependent fields are present (sqlite backend needs a path)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::{AppConfig, Backend};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address must not be empty")]
    EmptyBindAddress,

    #[error("muxer.static_prefix {0:?} must start and end with '/'")]
    StaticPrefix(String),

    #[error("muxer.route_index {0:?} must start with '/'")]
    RouteIndexPath(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("sessions.cookie_name must not be empty")]
    EmptyCookieName,

    #[error("database.sqlite_path is required for the sqlite backend")]
    MissingSqlitePath,

    #[error("templates.extra_patterns requires templates.base_pattern")]
    ExtraWithoutBase,
}

/// Check `config` for semantic errors, reporting every one found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.trim().is_empty() {
        errors.push(ValidationError::EmptyBindAddress);
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("listener.max_body_bytes"));
    }

    let prefix = &config.muxer.static_prefix;
    if config.muxer.static_dir.is_some() && (!prefix.starts_with('/') || !prefix.ends_with('/')) {
        errors.push(ValidationError::StaticPrefix(prefix.clone()));
    }
    if let Some(path) = &config.muxer.route_index {
        if !path.starts_with('/') {
            errors.push(ValidationError::RouteIndexPath(path.clone()));
        }
    }

    if config.sessions.cookie_name.trim().is_empty() {
        errors.push(ValidationError::EmptyCookieName);
    }
    if config.sessions.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("sessions.timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }

    if config.database.backend == Backend::Sqlite && config.database.sqlite_path.is_none() {
        errors.push(ValidationError::MissingSqlitePath);
    }
    if config.templates.base_pattern.is_none() && !config.templates.extra_patterns.is_empty() {
        errors.push(ValidationError::ExtraWithoutBase);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = AppConfig::default();
        config.listener.bind_address = String::new();
        config.muxer.static_prefix = "/static".to_string();
        config.muxer.route_index = Some("routes".to_string());
        config.sessions.cookie_name = " ".to_string();
        config.sessions.timeout_secs = 0;
        config.timeouts.request_secs = 0;
        config.database.backend = Backend::Sqlite;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 7);
        assert!(errors.contains(&ValidationError::MissingSqlitePath));
        assert!(errors.contains(&ValidationError::ZeroValue("timeouts.request_secs")));
    }

    #[test]
    fn test_static_prefix_ignored_without_dir() {
        let mut config = AppConfig::default();
        config.muxer.static_dir = None;
        config.muxer.static_prefix = "assets".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
