//! Route registration and dispatch.
//!
//! # Responsibilities
//! - Register handlers per (method, pattern)
//! - Keep the exact map, param list and subtree list in precedence order
//! - Resolve a request to a handler, a 405 or a 404
//! - Log and measure every dispatched request
//!
//! # Design Decisions
//! - `Muxer` is the mutable builder, `Dispatcher` the frozen result
//! - O(1) lookup for static paths via HashMap
//! - O(n) scan of param and subtree patterns (acceptable for typical route counts)
//! - Method resolution falls through to lower-precedence candidates before
//!   giving up with 405

use std::cmp::Ordering;
use std::collections::HashMap;
use std::convert::Infallible;
use std::path::Path;
use std::time::Instant;

use axum::body::Body;
use axum::extract::Request;
use axum::handler::Handler;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use tower::util::BoxCloneSyncService;
use tower::{Service, ServiceExt};
use tower_http::services::ServeDir;

use crate::http::request::RequestIdExt;
use crate::observability::metrics;
use crate::routing::{decode_path, Params, Pattern, PatternKind, RouteError};

/// A type-erased handler bound to its state.
pub type BoxHandler = BoxCloneSyncService<Request, Response, Infallible>;

/// Methods a `forward` redirect answers.
const FORWARD_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

struct Route {
    pattern: Pattern,
    handlers: Vec<(Method, BoxHandler)>,
}

impl Route {
    fn find(&self, method: &Method) -> Option<&BoxHandler> {
        self.handlers
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, handler)| handler)
    }

    fn handler_for(&self, method: &Method) -> Option<&BoxHandler> {
        match self.find(method) {
            Some(handler) => Some(handler),
            None if *method == Method::HEAD => self.find(&Method::GET),
            None => None,
        }
    }
}

#[derive(Default)]
struct RouteTable {
    routes: Vec<Route>,
    by_pattern: HashMap<String, usize>,
    exact: HashMap<String, usize>,
    parameterized: Vec<usize>,
    subtrees: Vec<usize>,
}

impl RouteTable {
    fn insert(&mut self, method: Method, raw: &str, handler: BoxHandler) -> Result<(), RouteError> {
        let idx = match self.by_pattern.get(raw) {
            Some(&idx) => idx,
            None => self.add_pattern(Pattern::parse(raw)?),
        };

        let route = &mut self.routes[idx];
        if route.handlers.iter().any(|(m, _)| *m == method) {
            return Err(RouteError::Duplicate {
                method,
                pattern: raw.to_string(),
            });
        }
        route.handlers.push((method, handler));
        Ok(())
    }

    fn add_pattern(&mut self, pattern: Pattern) -> usize {
        let idx = self.routes.len();
        let raw = pattern.as_str().to_string();

        match pattern.kind() {
            PatternKind::Static => {
                self.exact.insert(raw.clone(), idx);
            }
            PatternKind::Parameterized => {
                let pos = self
                    .parameterized
                    .iter()
                    .position(|&other| {
                        pattern.specificity_cmp(&self.routes[other].pattern) == Ordering::Less
                    })
                    .unwrap_or(self.parameterized.len());
                self.parameterized.insert(pos, idx);
            }
            PatternKind::Subtree => {
                let pos = self
                    .subtrees
                    .iter()
                    .position(|&other| self.routes[other].pattern.as_str().len() < raw.len())
                    .unwrap_or(self.subtrees.len());
                self.subtrees.insert(pos, idx);
            }
        }

        self.routes.push(Route {
            pattern,
            handlers: Vec::new(),
        });
        self.by_pattern.insert(raw, idx);
        idx
    }

    /// Routes whose pattern matches `path`, in precedence order.
    fn candidates<'a>(&'a self, path: &'a str) -> impl Iterator<Item = (&'a Route, Params)> + 'a {
        let exact = self
            .exact
            .get(path)
            .map(|&idx| (&self.routes[idx], Params::default()));
        let scan = move |idx: &usize| {
            let route = &self.routes[*idx];
            route.pattern.matches(path).map(|params| (route, params))
        };

        exact
            .into_iter()
            .chain(self.parameterized.iter().filter_map(scan))
            .chain(self.subtrees.iter().filter_map(scan))
    }

    fn lookup<'a>(&'a self, method: &Method, path: &'a str) -> Lookup<'a> {
        let mut allowed: Vec<Method> = Vec::new();
        for (route, params) in self.candidates(path) {
            if let Some(handler) = route.handler_for(method) {
                return Lookup::Found {
                    pattern: route.pattern.as_str(),
                    handler,
                    params,
                };
            }
            for (m, _) in &route.handlers {
                if !allowed.contains(m) {
                    allowed.push(m.clone());
                }
            }
        }

        if allowed.is_empty() {
            return Lookup::NotFound;
        }
        if allowed.contains(&Method::GET) && !allowed.contains(&Method::HEAD) {
            allowed.push(Method::HEAD);
        }
        Lookup::MethodNotAllowed { allowed }
    }

    fn entries(&self) -> Vec<String> {
        let mut entries: Vec<String> = self
            .routes
            .iter()
            .flat_map(|route| {
                route
                    .handlers
                    .iter()
                    .map(move |(method, _)| format!("{} {}", method, route.pattern.as_str()))
            })
            .collect();
        entries.sort();
        entries
    }
}

/// Outcome of resolving a method and path.
pub enum Lookup<'a> {
    Found {
        pattern: &'a str,
        handler: &'a BoxHandler,
        params: Params,
    },
    MethodNotAllowed {
        allowed: Vec<Method>,
    },
    NotFound,
}

/// Request multiplexer builder.
///
/// Handlers are axum handlers bound to the shared state `S` at registration
/// time, so the frozen [`Dispatcher`] is not generic.
pub struct Muxer<S> {
    state: S,
    table: RouteTable,
    not_found: Option<BoxHandler>,
    route_index: Option<String>,
    log_requests: bool,
}

impl<S> Muxer<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(state: S) -> Self {
        Self {
            state,
            table: RouteTable::default(),
            not_found: None,
            route_index: None,
            log_requests: true,
        }
    }

    pub fn log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Register `handler` for `method` on `pattern`.
    pub fn handle<H, T>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, RouteError>
    where
        H: Handler<T, S>,
        T: 'static,
    {
        let service = handler.with_state(self.state.clone());
        self.handle_service(method, pattern, service)
    }

    /// Register a raw tower service for `method` on `pattern`.
    pub fn handle_service<Svc>(
        &mut self,
        method: Method,
        pattern: &str,
        service: Svc,
    ) -> Result<&mut Self, RouteError>
    where
        Svc: Service<Request, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
        Svc::Future: Send + 'static,
    {
        self.table
            .insert(method, pattern, BoxCloneSyncService::new(service))?;
        Ok(self)
    }

    pub fn get<H, T>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, RouteError>
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.handle(Method::GET, pattern, handler)
    }

    pub fn post<H, T>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, RouteError>
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.handle(Method::POST, pattern, handler)
    }

    pub fn put<H, T>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, RouteError>
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.handle(Method::PUT, pattern, handler)
    }

    pub fn delete<H, T>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, RouteError>
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.handle(Method::DELETE, pattern, handler)
    }

    /// Redirect every request for `old` to `new` with 307, keeping the method.
    pub fn forward(&mut self, old: &str, new: &str) -> Result<&mut Self, RouteError> {
        let target = new.to_string();
        for method in FORWARD_METHODS {
            let target = target.clone();
            self.handle(method, old, move || async move { Redirect::temporary(&target) })?;
        }
        Ok(self)
    }

    /// Serve files from `dir` below the subtree `prefix`.
    ///
    /// The prefix is stripped before the file lookup, so `/static/css/a.css`
    /// with prefix `/static/` reads `dir/css/a.css`.
    pub fn static_dir(&mut self, prefix: &str, dir: impl AsRef<Path>) -> Result<&mut Self, RouteError> {
        let mut pattern = prefix.to_string();
        if !pattern.ends_with('/') {
            pattern.push('/');
        }
        let strip = pattern.trim_end_matches('/').to_string();
        let serve = ServeDir::new(dir.as_ref());

        self.handle(Method::GET, &pattern, move |req: Request| {
            let serve = serve.clone();
            let req = strip_prefix(req, &strip);
            async move {
                match serve.oneshot(req).await {
                    Ok(res) => res.map(Body::new),
                    Err(never) => match never {},
                }
            }
        })
    }

    /// Handler used when no pattern matches the path.
    pub fn not_found<H, T>(&mut self, handler: H) -> &mut Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.not_found = Some(BoxCloneSyncService::new(
            handler.with_state(self.state.clone()),
        ));
        self
    }

    /// Serve an HTML listing of every registered route at `path`.
    ///
    /// The listing is rendered when the muxer is built, so it includes
    /// routes registered after this call.
    pub fn route_index(&mut self, path: &str) -> &mut Self {
        self.route_index = Some(path.to_string());
        self
    }

    /// Registered routes as `"METHOD pattern"`, sorted.
    pub fn entries(&self) -> Vec<String> {
        self.table.entries()
    }

    /// Freeze the registrations into a dispatcher.
    pub fn build(mut self) -> Result<Dispatcher, RouteError> {
        if let Some(path) = self.route_index.take() {
            let mut entries = self.table.entries();
            entries.push(format!("{} {}", Method::GET, path));
            entries.sort();
            let page = render_route_index(&entries);
            self.handle(Method::GET, &path, move || async move { Html(page) })?;
        }

        tracing::debug!(routes = self.table.routes.len(), "Muxer built");
        Ok(Dispatcher {
            table: self.table,
            not_found: self.not_found,
            log_requests: self.log_requests,
        })
    }
}

/// Immutable route table shared by every connection.
pub struct Dispatcher {
    table: RouteTable,
    not_found: Option<BoxHandler>,
    log_requests: bool,
}

impl Dispatcher {
    /// Resolve `method` and a decoded `path` without running anything.
    pub fn lookup<'a>(&'a self, method: &Method, path: &'a str) -> Lookup<'a> {
        self.table.lookup(method, path)
    }

    pub fn entries(&self) -> Vec<String> {
        self.table.entries()
    }

    /// Route the request and run the selected handler.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let decoded = decode_path(&path);
        let request_id = req.headers().request_id().map(str::to_owned);

        let (route, response) = if path == "*" {
            ("*", bad_request_close())
        } else if let Some(location) = canonical_location(req.uri()) {
            (
                "redirect",
                (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response(),
            )
        } else {
            match self.table.lookup(&method, &decoded) {
                Lookup::Found {
                    pattern,
                    handler,
                    params,
                } => {
                    req.extensions_mut().insert(params);
                    (pattern, call(handler, req).await)
                }
                Lookup::MethodNotAllowed { allowed } => ("none", method_not_allowed(&allowed)),
                Lookup::NotFound => match &self.not_found {
                    Some(handler) => ("none", call(handler, req).await),
                    None => ("none", (StatusCode::NOT_FOUND, "404 page not found\n").into_response()),
                },
            }
        };

        let status = response.status();
        if self.log_requests {
            let request_id = request_id.as_deref().unwrap_or("unknown");
            if status.is_client_error() || status.is_server_error() {
                tracing::warn!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    route = %route,
                    status = status.as_u16(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Request failed"
                );
            } else {
                tracing::info!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    route = %route,
                    status = status.as_u16(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Request handled"
                );
            }
        }
        metrics::record_request(method.as_str(), status.as_u16(), route, start);

        response
    }
}

async fn call(handler: &BoxHandler, req: Request) -> Response {
    match handler.clone().oneshot(req).await {
        Ok(response) => response,
        Err(never) => match never {},
    }
}

fn bad_request_close() -> Response {
    (
        StatusCode::BAD_REQUEST,
        [(header::CONNECTION, "close")],
        "400 bad request\n",
    )
        .into_response()
}

fn method_not_allowed(allowed: &[Method]) -> Response {
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, allow)],
        "405 method not allowed\n",
    )
        .into_response()
}

/// Redirect target when `uri` has a non-canonical path.
fn canonical_location(uri: &Uri) -> Option<String> {
    let path = uri.path();
    let cleaned = clean_path(path);
    if cleaned == path {
        return None;
    }
    Some(match uri.query() {
        Some(query) => format!("{cleaned}?{query}"),
        None => cleaned,
    })
}

/// Canonical form of a URL path.
///
/// Collapses repeated slashes, drops `.` segments and resolves `..` against
/// the preceding segment. The result is rooted and keeps a trailing slash
/// if the input had one.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    let mut cleaned = String::with_capacity(path.len());
    cleaned.push('/');
    cleaned.push_str(&parts.join("/"));
    if path.ends_with('/') && cleaned != "/" {
        cleaned.push('/');
    }
    cleaned
}

fn strip_prefix(mut req: Request, prefix: &str) -> Request {
    let uri = req.uri();
    let rest = uri.path().strip_prefix(prefix).unwrap_or(uri.path());
    let rest = if rest.is_empty() { "/" } else { rest };
    let target = match uri.query() {
        Some(query) => format!("{rest}?{query}"),
        None => rest.to_string(),
    };
    if let Ok(stripped) = target.parse::<Uri>() {
        *req.uri_mut() = stripped;
    }
    req
}

fn render_route_index(entries: &[String]) -> String {
    let mut page = format!("<h3>Registered Routes ({})</h3>\n", entries.len());
    for entry in entries {
        let (method, pattern) = entry.split_once(' ').unwrap_or(("", entry));
        if method == Method::GET.as_str() {
            page.push_str(&format!("[{method}] <a href=\"{pattern}\">{pattern}</a><br>\n"));
        } else {
            page.push_str(&format!("[{method}] {pattern}<br>\n"));
        }
    }
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    async fn send(dispatcher: &Dispatcher, method: Method, uri: &str) -> (StatusCode, HeaderMap, String) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let res = dispatcher.dispatch(req).await;
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn matched(dispatcher: &Dispatcher, method: Method, path: &str) -> Option<String> {
        match dispatcher.lookup(&method, path) {
            Lookup::Found { pattern, .. } => Some(pattern.to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_precedence_exact_then_params_then_subtree() {
        let mut mux = Muxer::new(());
        mux.get("/static/", || async { "static" }).unwrap();
        mux.get("/:slug", || async { "slug" }).unwrap();
        mux.get("/contact", || async { "contact" }).unwrap();
        mux.get("/", || async { "home" }).unwrap();
        let dispatcher = mux.build().unwrap();

        assert_eq!(matched(&dispatcher, Method::GET, "/contact").as_deref(), Some("/contact"));
        assert_eq!(matched(&dispatcher, Method::GET, "/gizmo").as_deref(), Some("/:slug"));
        assert_eq!(matched(&dispatcher, Method::GET, "/").as_deref(), Some("/"));
        assert_eq!(
            matched(&dispatcher, Method::GET, "/static/app.js").as_deref(),
            Some("/static/")
        );
        assert_eq!(matched(&dispatcher, Method::GET, "/nothing/here"), None);
    }

    #[test]
    fn test_longest_subtree_wins() {
        let mut mux = Muxer::new(());
        mux.get("/a/", || async { "short" }).unwrap();
        mux.get("/a/b/c/", || async { "longest" }).unwrap();
        mux.get("/a/b/", || async { "middle" }).unwrap();
        let dispatcher = mux.build().unwrap();

        assert_eq!(matched(&dispatcher, Method::GET, "/a/b/c/d").as_deref(), Some("/a/b/c/"));
        assert_eq!(matched(&dispatcher, Method::GET, "/a/b/x").as_deref(), Some("/a/b/"));
        assert_eq!(matched(&dispatcher, Method::GET, "/a/x").as_deref(), Some("/a/"));
    }

    #[test]
    fn test_literal_beats_param_regardless_of_registration_order() {
        let mut mux = Muxer::new(());
        mux.get("/:slug/admin", || async { "admin" }).unwrap();
        mux.get("/user/:id", || async { "user" }).unwrap();
        let dispatcher = mux.build().unwrap();

        assert_eq!(matched(&dispatcher, Method::GET, "/user/admin").as_deref(), Some("/user/:id"));
        assert_eq!(matched(&dispatcher, Method::GET, "/gizmo/admin").as_deref(), Some("/:slug/admin"));
    }

    #[test]
    fn test_equal_specificity_keeps_registration_order() {
        let mut mux = Muxer::new(());
        mux.get("/:a/x", || async { "a" }).unwrap();
        mux.get("/:b/x", || async { "b" }).unwrap();
        let dispatcher = mux.build().unwrap();
        assert_eq!(matched(&dispatcher, Method::GET, "/foo/x").as_deref(), Some("/:a/x"));

        let mut mux = Muxer::new(());
        mux.get("/:b/x", || async { "b" }).unwrap();
        mux.get("/:a/x", || async { "a" }).unwrap();
        let dispatcher = mux.build().unwrap();
        assert_eq!(matched(&dispatcher, Method::GET, "/foo/x").as_deref(), Some("/:b/x"));
    }

    #[tokio::test]
    async fn test_encoded_literal_matches_exact_route() {
        let mut mux = Muxer::new(());
        mux.get("/contact", || async { "contact" }).unwrap();
        mux.get("/:slug", |params: Params| async move {
            format!("widget {}", params.get("slug").unwrap_or_default())
        })
        .unwrap();
        let dispatcher = mux.build().unwrap();

        let (status, _, body) = send(&dispatcher, Method::GET, "/c%6Fntact").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "contact");

        let (_, _, body) = send(&dispatcher, Method::GET, "/blue%20gizmo").await;
        assert_eq!(body, "widget blue gizmo");

        let (status, _, body) = send(&dispatcher, Method::GET, "/%FF").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "widget %FF");
    }

    #[test]
    fn test_duplicate_registration_is_error() {
        let mut mux = Muxer::new(());
        mux.get("/user", || async { "a" }).unwrap();
        mux.post("/user", || async { "b" }).unwrap();

        let err = mux.get("/user", || async { "c" }).err().unwrap();
        assert!(matches!(err, RouteError::Duplicate { .. }));
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let mut mux = Muxer::new(());
        let err = mux.get("/files/:name/", || async { "x" }).err().unwrap();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));
    }

    #[test]
    fn test_entries_are_sorted() {
        let mut mux = Muxer::new(());
        mux.post("/api/widgets", || async { "" }).unwrap();
        mux.get("/api/widgets", || async { "" }).unwrap();
        mux.get("/", || async { "" }).unwrap();

        assert_eq!(mux.entries(), ["GET /", "GET /api/widgets", "POST /api/widgets"]);
    }

    #[tokio::test]
    async fn test_dispatch_passes_params() {
        let mut mux = Muxer::new(());
        mux.post("/api/widgets/:slug/parts/:id/update", |params: Params| async move {
            format!(
                "apiUpdateWidgetPart {} {}\n",
                params.get("slug").unwrap_or_default(),
                params.get_parsed::<u64>("id").unwrap_or_default()
            )
        })
        .unwrap();
        let dispatcher = mux.build().unwrap();

        let (status, _, body) = send(&dispatcher, Method::POST, "/api/widgets/gizmo/parts/7/update").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "apiUpdateWidgetPart gizmo 7\n");
    }

    #[tokio::test]
    async fn test_method_not_allowed_lists_union() {
        let mut mux = Muxer::new(());
        mux.post("/api/widgets/:slug", || async { "update" }).unwrap();
        mux.get("/api/widgets/", || async { "subtree" }).unwrap();
        let dispatcher = mux.build().unwrap();

        let (status, headers, _) = send(&dispatcher, Method::DELETE, "/api/widgets/gizmo").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(headers.get(header::ALLOW).unwrap(), "POST, GET, HEAD");
    }

    #[tokio::test]
    async fn test_method_falls_through_to_lower_precedence() {
        let mut mux = Muxer::new(());
        mux.post("/api/widgets/:slug", || async { "update" }).unwrap();
        mux.get("/api/widgets/", || async { "subtree" }).unwrap();
        let dispatcher = mux.build().unwrap();

        let (status, _, body) = send(&dispatcher, Method::GET, "/api/widgets/gizmo").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "subtree");
    }

    #[tokio::test]
    async fn test_head_falls_back_to_get() {
        let mut mux = Muxer::new(());
        mux.get("/contact", || async { "contact" }).unwrap();
        let dispatcher = mux.build().unwrap();

        let (status, _, _) = send(&dispatcher, Method::HEAD, "/contact").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_not_found_default_and_custom() {
        let mux = Muxer::new(());
        let dispatcher = mux.build().unwrap();
        let (status, _, body) = send(&dispatcher, Method::GET, "/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "404 page not found\n");

        let mut mux = Muxer::new(());
        mux.not_found(|| async { (StatusCode::NOT_FOUND, "custom") });
        let dispatcher = mux.build().unwrap();
        let (status, _, body) = send(&dispatcher, Method::GET, "/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "custom");
    }

    #[tokio::test]
    async fn test_non_canonical_path_redirects() {
        let mut mux = Muxer::new(());
        mux.get("/a/b", || async { "ab" }).unwrap();
        let dispatcher = mux.build().unwrap();

        let (status, headers, _) = send(&dispatcher, Method::GET, "/a/x/../b?q=1").await;
        assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
        assert_eq!(headers.get(header::LOCATION).unwrap(), "/a/b?q=1");

        let (status, headers, _) = send(&dispatcher, Method::GET, "/a//b/").await;
        assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
        assert_eq!(headers.get(header::LOCATION).unwrap(), "/a/b/");
    }

    #[tokio::test]
    async fn test_asterisk_is_bad_request() {
        let dispatcher = Muxer::new(()).build().unwrap();
        let (status, headers, _) = send(&dispatcher, Method::OPTIONS, "*").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers.get(header::CONNECTION).unwrap(), "close");
    }

    #[tokio::test]
    async fn test_forward_redirects_temporarily() {
        let mut mux = Muxer::new(());
        mux.forward("/old", "/new").unwrap();
        let dispatcher = mux.build().unwrap();

        let (status, headers, _) = send(&dispatcher, Method::POST, "/old").await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(headers.get(header::LOCATION).unwrap(), "/new");
    }

    #[tokio::test]
    async fn test_static_dir_strips_prefix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("css")).unwrap();
        std::fs::write(dir.path().join("css/site.css"), "body {}").unwrap();

        let mut mux = Muxer::new(());
        mux.static_dir("/static/", dir.path()).unwrap();
        let dispatcher = mux.build().unwrap();

        let (status, _, body) = send(&dispatcher, Method::GET, "/static/css/site.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "body {}");

        let (status, _, _) = send(&dispatcher, Method::GET, "/static/missing.css").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_route_index_lists_routes() {
        let mut mux = Muxer::new(());
        mux.route_index("/routes");
        mux.get("/contact", || async { "contact" }).unwrap();
        mux.post("/login", || async { "login" }).unwrap();
        let dispatcher = mux.build().unwrap();

        let (status, _, body) = send(&dispatcher, Method::GET, "/routes").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Registered Routes (3)"));
        assert!(body.contains("<a href=\"/contact\">/contact</a>"));
        assert!(body.contains("[POST] /login"));
    }

    #[test]
    fn test_clean_path() {
        let cases = [
            ("", "/"),
            ("/", "/"),
            ("/a/b", "/a/b"),
            ("/a//b", "/a/b"),
            ("/a/./b/", "/a/b/"),
            ("/a/b/..", "/a"),
            ("/../a", "/a"),
            ("a/b", "/a/b"),
        ];
        for (input, expected) in cases {
            assert_eq!(clean_path(input), expected, "clean_path({input:?})");
        }
    }
}
