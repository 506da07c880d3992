//! Error pages.
//!
//! # Responsibilities
//! - Render a status-code page for `/error/<code>`
//! - Provide long descriptions for the common status codes
//!
//! # Design Decisions
//! - The page template is embedded and registered once, on first use
//! - A render failure degrades to a plain-text body with the same status

use std::sync::OnceLock;

use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use handlebars::Handlebars;
use serde::Serialize;

use crate::routing::PathId;

const ERROR_PAGE: &str = "error_page";

const ERROR_PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{code}} {{reason}}</title>
</head>
<body>
  <h1>{{code}}</h1>
  <h2>{{reason}}</h2>
  <p>{{description}}</p>
</body>
</html>
"#;

#[derive(Serialize)]
struct ErrorPage<'a> {
    code: u16,
    reason: &'a str,
    description: &'a str,
}

fn registry() -> &'static Handlebars<'static> {
    static REGISTRY: OnceLock<Handlebars<'static>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut registry = Handlebars::new();
        if let Err(e) = registry.register_template_string(ERROR_PAGE, ERROR_PAGE_TEMPLATE) {
            tracing::error!(error = %e, "Failed to register error page template");
        }
        registry
    })
}

/// Long description of a status code. Unknown codes get an empty string.
pub fn status_long_text(code: StatusCode) -> &'static str {
    match code.as_u16() {
        400 => "The server could not understand the request due to invalid syntax.",
        401 => "You must authenticate yourself to get the requested response.",
        403 => "You do not have access rights to the content.",
        404 => "The server can not find the requested resource.",
        405 => "The request method is known by the server but is not supported by the target resource.",
        408 => "The server timed out waiting for the request.",
        409 => "The request conflicts with the current state of the server.",
        413 => "The request entity is larger than limits defined by the server.",
        415 => "The media format of the requested data is not supported by the server.",
        417 => "The expectation indicated by the Expect request header can not be met by the server.",
        429 => "The user has sent too many requests in a given amount of time.",
        500 => "The server has encountered a situation it does not know how to handle.",
        501 => "The request method is not supported by the server and cannot be handled.",
        502 => "The server got an invalid response while working as a gateway.",
        503 => "The server is not ready to handle the request.",
        504 => "The server is acting as a gateway and cannot get a response in time.",
        _ => "",
    }
}

/// Render the page for `code`.
pub fn render_error_page(code: StatusCode) -> Result<String, handlebars::RenderError> {
    let page = ErrorPage {
        code: code.as_u16(),
        reason: code.canonical_reason().unwrap_or("Unknown"),
        description: status_long_text(code),
    };
    registry().render(ERROR_PAGE, &page)
}

/// Response carrying the rendered page with `code` as its status.
pub fn error_response(code: StatusCode) -> Response {
    match render_error_page(code) {
        Ok(html) => (code, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, code = code.as_u16(), "Failed to render error page");
            (code, code.to_string()).into_response()
        }
    }
}

/// Handler for the `/error/` subtree.
///
/// `/error/404` renders the 404 page with a 200 status, a non-numeric id
/// is answered with 417, and `/error/` alone yields an empty 200.
pub async fn error_page(uri: Uri) -> Response {
    let path_id = PathId::parse(uri.path());
    if !path_id.has_id() {
        return StatusCode::OK.into_response();
    }

    let code = match path_id
        .id
        .parse::<u16>()
        .ok()
        .and_then(|n| StatusCode::from_u16(n).ok())
    {
        Some(code) => code,
        None => return StatusCode::EXPECTATION_FAILED.into_response(),
    };

    match render_error_page(code) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render error page");
            StatusCode::EXPECTATION_FAILED.into_response()
        }
    }
}

/// Handler answering 404 with the rendered error page.
pub async fn not_found_page() -> Response {
    error_response(StatusCode::NOT_FOUND)
}
