//! Glob-loaded Handlebars template cache.
//!
//! # Responsibilities
//! - Register every file matched by the base glob and any extra globs
//! - Render templates by file name
//! - Rebuild the registry on demand and swap it in atomically
//!
//! # Design Decisions
//! - Readers load the current registry from an `ArcSwap` and never block
//! - A glob that matches nothing is an error, so typos fail at startup
//! - Templates are named by file name only; the same name in two
//!   directories resolves to whichever was registered last

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::UNIX_EPOCH;

use arc_swap::ArcSwap;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use handlebars::Handlebars;
use serde::Serialize;

use crate::templates::TemplateError;

/// Hook that registers helpers on every fresh registry.
pub type HelperFn = Arc<dyn Fn(&mut Handlebars<'static>) + Send + Sync>;

pub struct TemplateCache {
    registry: ArcSwap<Handlebars<'static>>,
    base_pattern: String,
    extra_patterns: Mutex<Vec<String>>,
    helpers: Option<HelperFn>,
}

impl TemplateCache {
    /// Load every template matched by `base_pattern`.
    pub fn new(base_pattern: &str) -> Result<Self, TemplateError> {
        Self::build(base_pattern, None)
    }

    /// Like [`TemplateCache::new`], registering helpers before any template.
    pub fn with_helpers(base_pattern: &str, helpers: HelperFn) -> Result<Self, TemplateError> {
        Self::build(base_pattern, Some(helpers))
    }

    fn build(base_pattern: &str, helpers: Option<HelperFn>) -> Result<Self, TemplateError> {
        let mut registry = fresh_registry(helpers.as_ref());
        let count = load_pattern(&mut registry, base_pattern)?;
        tracing::debug!(pattern = %base_pattern, templates = count, "Templates loaded");

        Ok(Self {
            registry: ArcSwap::from_pointee(registry),
            base_pattern: base_pattern.to_string(),
            extra_patterns: Mutex::new(Vec::new()),
            helpers,
        })
    }

    /// Register the files matched by `pattern` and keep the pattern for
    /// later reloads.
    pub fn parse_glob(&self, pattern: &str) -> Result<usize, TemplateError> {
        let mut extras = self.lock_patterns();
        let mut next = Handlebars::clone(&self.registry.load());
        let count = load_pattern(&mut next, pattern)?;
        self.registry.store(Arc::new(next));
        extras.push(pattern.to_string());
        Ok(count)
    }

    /// Rebuild the registry from the base and every extra pattern.
    ///
    /// On error the previous registry stays in place.
    pub fn reload(&self) -> Result<(), TemplateError> {
        // Held across the swap; `parse_glob` and `reload` never interleave.
        let extras = self.lock_patterns();
        let mut next = fresh_registry(self.helpers.as_ref());
        let mut count = load_pattern(&mut next, &self.base_pattern)?;
        for pattern in extras.iter() {
            count += load_pattern(&mut next, pattern)?;
        }
        self.registry.store(Arc::new(next));
        tracing::info!(templates = count, "Templates reloaded");
        Ok(())
    }

    fn lock_patterns(&self) -> MutexGuard<'_, Vec<String>> {
        self.extra_patterns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The base pattern followed by the extra patterns, in parse order.
    pub fn patterns(&self) -> Vec<String> {
        let extras = self.lock_patterns();
        std::iter::once(self.base_pattern.clone())
            .chain(extras.iter().cloned())
            .collect()
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.registry.load().has_template(name)
    }

    /// Render `name` with `data`.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, TemplateError> {
        self.registry
            .load()
            .render(name, data)
            .map_err(|source| TemplateError::Render {
                name: name.to_string(),
                source: Box::new(source),
            })
    }

    /// Render `name` into an HTML response; failures answer 417.
    pub fn execute<T: Serialize>(&self, name: &str, data: &T) -> Response {
        match self.render(name, data) {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::error!(template = %name, error = %e, "Template execution failed");
                (StatusCode::EXPECTATION_FAILED, "Expectation Failed").into_response()
            }
        }
    }

    /// Names of every registered template, sorted.
    pub fn defined_templates(&self) -> Vec<String> {
        let registry = self.registry.load();
        let mut names: Vec<String> = registry.get_templates().keys().cloned().collect();
        names.sort();
        names
    }
}

fn fresh_registry(helpers: Option<&HelperFn>) -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    if let Some(register) = helpers {
        register(&mut registry);
    }
    registry
}

fn load_pattern(registry: &mut Handlebars<'static>, pattern: &str) -> Result<usize, TemplateError> {
    let paths = glob::glob(pattern).map_err(|source| TemplateError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut count = 0;
    for entry in paths {
        let path = entry?;
        if !path.is_file() {
            continue;
        }
        let name = template_name(&path)?;
        registry
            .register_template_file(&name, &path)
            .map_err(|source| TemplateError::Parse {
                name,
                source: Box::new(source),
            })?;
        count += 1;
    }

    if count == 0 {
        return Err(TemplateError::NoMatches(pattern.to_string()));
    }
    Ok(count)
}

fn template_name(path: &Path) -> Result<String, TemplateError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| TemplateError::InvalidName(PathBuf::from(path)))
}

/// Modification time of `path` in Unix seconds, and whether it is newer
/// than `last_mtime`. A missing or unreadable file yields `(-1, false)`.
pub fn file_has_changed(path: impl AsRef<Path>, last_mtime: i64) -> (i64, bool) {
    let mtime = std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
        .map(|since| since.as_secs() as i64);

    match mtime {
        Some(mtime) => (mtime, mtime > last_mtime),
        None => (-1, false),
    }
}
