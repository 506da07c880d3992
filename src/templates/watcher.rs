//! Template directory watcher for hot reload.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::templates::TemplateCache;

/// Watches the directories behind the cache's globs and reloads the cache
/// when a file in them changes.
pub struct TemplateWatcher {
    cache: Arc<TemplateCache>,
    roots: Vec<(PathBuf, RecursiveMode)>,
}

impl TemplateWatcher {
    pub fn new(cache: Arc<TemplateCache>) -> Self {
        let mut roots: Vec<(PathBuf, RecursiveMode)> = Vec::new();
        for pattern in cache.patterns() {
            let root = glob_root(&pattern);
            let mode = if pattern.contains("**") {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            if !roots.iter().any(|(existing, _)| *existing == root) {
                roots.push((root, mode));
            }
        }
        Self { cache, roots }
    }

    /// Directories that will be watched.
    pub fn roots(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(|(root, _)| root.as_path())
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive; dropping it stops the watch.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let cache = self.cache.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                        tracing::info!(paths = ?event.paths, "Template change detected, reloading...");
                        if let Err(e) = cache.reload() {
                            tracing::error!(
                                error = %e,
                                "Failed to reload templates. Keeping current templates."
                            );
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        for (root, mode) in &self.roots {
            watcher.watch(root, *mode)?;
            tracing::info!(path = ?root, "Template watcher started");
        }
        Ok(watcher)
    }

    /// Start watching and hold the watch open until `shutdown` fires.
    pub fn spawn(self, mut shutdown: broadcast::Receiver<()>) -> Result<JoinHandle<()>, notify::Error> {
        let watcher = self.run()?;
        Ok(tokio::spawn(async move {
            let _ = shutdown.recv().await;
            drop(watcher);
            tracing::info!("Template watcher stopped");
        }))
    }
}

/// Longest leading directory of `pattern` free of glob syntax.
fn glob_root(pattern: &str) -> PathBuf {
    let mut root = PathBuf::new();
    for component in Path::new(pattern).components() {
        if let Component::Normal(part) = component {
            let part = part.to_string_lossy();
            if part.contains(['*', '?', '[']) {
                break;
            }
        }
        root.push(component);
    }

    if root.as_os_str() == pattern {
        // No glob syntax at all: the pattern names a single file.
        root.pop();
    }
    if root.as_os_str().is_empty() {
        root.push(".");
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;
    use std::fs;

    #[test]
    fn test_glob_root() {
        assert_eq!(glob_root("web/templates/*.html"), PathBuf::from("web/templates"));
        assert_eq!(glob_root("web/**/*.html"), PathBuf::from("web"));
        assert_eq!(glob_root("web/templates/user.html"), PathBuf::from("web/templates"));
        assert_eq!(glob_root("*.html"), PathBuf::from("."));
    }

    #[test]
    fn test_roots_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.html"), "a").unwrap();
        fs::write(dir.path().join("b.tmpl"), "b").unwrap();

        let base = dir.path().join("*.html").to_string_lossy().into_owned();
        let extra = dir.path().join("*.tmpl").to_string_lossy().into_owned();
        let cache = Arc::new(TemplateCache::new(&base).unwrap());
        cache.parse_glob(&extra).unwrap();

        let watcher = TemplateWatcher::new(cache);
        let roots: Vec<_> = watcher.roots().collect();
        assert_eq!(roots, [dir.path()]);
    }

    #[test]
    fn test_run_watches_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.html"), "a").unwrap();
        let base = dir.path().join("*.html").to_string_lossy().into_owned();
        let cache = Arc::new(TemplateCache::new(&base).unwrap());

        assert!(TemplateWatcher::new(cache).run().is_ok());
    }

    #[tokio::test]
    async fn test_spawned_watcher_stops_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.html"), "a").unwrap();
        let base = dir.path().join("*.html").to_string_lossy().into_owned();
        let cache = Arc::new(TemplateCache::new(&base).unwrap());

        let shutdown = Shutdown::new();
        let handle = TemplateWatcher::new(cache).spawn(shutdown.subscribe()).unwrap();
        assert_eq!(shutdown.receiver_count(), 1);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("watcher task did not stop")
            .unwrap();
        assert_eq!(shutdown.receiver_count(), 0);
    }
}
