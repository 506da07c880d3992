//! Login, logout and a session-protected page.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::json;

use crate::apps::{AppError, AppState};
use crate::forms::{self, Field, FieldType};
use crate::routing::{Muxer, RouteError};
use crate::sessions::CurrentSession;

const LOGIN_TEMPLATE: &str = "login.html";
const HOME_TEMPLATE: &str = "home.html";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub fn routes(mux: &mut Muxer<AppState>) -> Result<(), RouteError> {
    mux.get("/login", login_form)?
        .post("/login", login)?
        .get("/logout", logout)?
        .get("/secure/home", secure_home)?
        .get("/templates", templates)?;
    Ok(())
}

pub fn login_form_markup() -> forms::Form {
    forms::Form::new(
        "Login",
        "/login",
        "Login",
        false,
        vec![
            Field::new("username", FieldType::Text).required(),
            Field::new("password", FieldType::Password).required(),
        ],
    )
}

async fn login_form(State(state): State<AppState>) -> Result<Response, AppError> {
    if let Some(cache) = state.template(LOGIN_TEMPLATE) {
        return Ok(cache.execute(LOGIN_TEMPLATE, &json!({ "title": "Login" })));
    }
    Ok(Html(login_form_markup().render()?).into_response())
}

async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let Some(user) = state.auth.authenticate(&form.username, &form.password) else {
        tracing::warn!(username = %form.username, "Login failed");
        return Err(AppError::Unauthorized);
    };

    let mut session = state.sessions.new_session();
    session.set("role", user.role.as_str());
    session.set("username", user.username.as_str());
    let cookie = state.sessions.save(session)?;
    tracing::info!(username = %user.username, role = %user.role, "Login succeeded");

    Ok((cookie, Redirect::to("/secure/home")))
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<impl IntoResponse, AppError> {
    let cookie = state.sessions.remove(&headers)?;
    Ok((cookie, Redirect::to("/login")))
}

async fn secure_home(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    let session = session.ok_or(AppError::Unauthorized)?;
    let username = session.get_str("username").unwrap_or_default();
    let role = session.get_str("role").unwrap_or_default();

    if let Some(cache) = state.template(HOME_TEMPLATE) {
        return Ok(cache.execute(HOME_TEMPLATE, &json!({ "username": username, "role": role })));
    }
    Ok(format!("this is my secure home\nuser={} role={}\n", username, role).into_response())
}

async fn templates(State(state): State<AppState>) -> Json<Vec<String>> {
    let names = state
        .templates
        .as_ref()
        .map(|cache| cache.defined_templates())
        .unwrap_or_default();
    Json(names)
}
