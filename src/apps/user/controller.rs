//! HTTP handlers for the user app.

use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use serde_json::json;

use crate::apps::user::{User, UserForm};
use crate::apps::{AppError, AppState};
use crate::forms::{self, Field, FieldType};
use crate::routing::{Muxer, Params, RouteError};

const USER_TEMPLATE: &str = "user.html";

pub fn routes(mux: &mut Muxer<AppState>) -> Result<(), RouteError> {
    mux.get("/user", register_form)?
        .post("/user", register)?
        .get("/user/all", list_users)?
        .get("/user/:id", get_user)?
        .post("/user/:id", update_user)?
        .post("/user/:id/delete", delete_user)?;
    Ok(())
}

fn user_id(params: &Params) -> Result<u64, AppError> {
    params
        .get_parsed("id")
        .ok_or_else(|| AppError::BadRequest(format!("invalid user id {:?}", params.get("id").unwrap_or(""))))
}

pub fn registration_form() -> forms::Form {
    forms::Form::new(
        "Register",
        "/user",
        "Register",
        true,
        vec![
            Field::new("first", FieldType::Text).placeholder("First name"),
            Field::new("last", FieldType::Text).placeholder("Last name"),
            Field::new("email", FieldType::Email).required(),
            Field::new("password", FieldType::Password).required(),
        ],
    )
}

async fn register_form(State(state): State<AppState>) -> Result<Response, AppError> {
    if let Some(cache) = state.template(USER_TEMPLATE) {
        return Ok(cache.execute(USER_TEMPLATE, &json!({ "title": "Register" })));
    }
    Ok(Html(registration_form().render()?).into_response())
}

async fn register(
    State(state): State<AppState>,
    Form(form): Form<UserForm>,
) -> Result<String, AppError> {
    let id = state.users.register(form)?;
    Ok(format!("successfully added user, id={}\n", id))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.users.all()?))
}

async fn get_user(State(state): State<AppState>, params: Params) -> Result<Json<User>, AppError> {
    let id = user_id(&params)?;
    Ok(Json(state.users.find(id)?))
}

async fn update_user(
    State(state): State<AppState>,
    params: Params,
    Form(form): Form<UserForm>,
) -> Result<String, AppError> {
    let id = user_id(&params)?;
    state.users.update(id, form)?;
    Ok(format!("successfully updated user, id={}\n", id))
}

async fn delete_user(State(state): State<AppState>, params: Params) -> Result<String, AppError> {
    let id = user_id(&params)?;
    state.users.remove(id)?;
    Ok(format!("successfully deleted user, id={}\n", id))
}
