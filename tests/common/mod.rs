//! Shared helpers for driving the app in memory.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use web_ddd::config::AppConfig;
use web_ddd::http::HttpServer;
use web_ddd::lifecycle::build_app;

/// Default config without static files, with a route index at `/routes`.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.muxer.static_dir = None;
    config.muxer.route_index = Some("/routes".to_string());
    config
}

/// Fully layered router for `config`.
pub fn app_with(config: AppConfig) -> Router {
    let (_, dispatcher) = build_app(&config).unwrap();
    HttpServer::new(config, dispatcher).router()
}

pub fn test_app() -> Router {
    app_with(test_config())
}

pub async fn send(app: &Router, method: Method, uri: &str, cookie: Option<&str>, form: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match form {
        Some(form) => {
            builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            Body::from(form.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_form(app: &Router, uri: &str, form: &str) -> Response {
    send(app, Method::POST, uri, None, Some(form)).await
}

pub async fn body_string(res: Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// `name=value` of the response's `Set-Cookie`, ready for a `Cookie` header.
pub fn cookie_pair(res: &Response) -> Option<String> {
    let raw = res.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    raw.split(';').next().map(str::to_string)
}
