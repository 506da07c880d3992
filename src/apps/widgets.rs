//! Widget catalog: the route table used to exercise pattern precedence.
//!
//! `/api/widgets/...` and `/:slug/...` overlap on purpose; literal
//! segments win over parameters at the same position.

use axum::extract::State;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::apps::{AppError, AppState, ServiceError};
use crate::routing::{Muxer, Params, RouteError};
use crate::storage::{Dao, Entity, MemoryDataSource};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Widget {
    pub id: u64,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub id: u64,
    pub widget: String,
    pub name: String,
}

impl Entity for Widget {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl Entity for Part {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default)]
pub struct WidgetCatalog {
    widgets: MemoryDataSource<Widget>,
    parts: MemoryDataSource<Part>,
}

impl WidgetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Result<Vec<Widget>, ServiceError> {
        Ok(self.widgets.get_all()?)
    }

    pub fn find(&self, slug: &str) -> Result<Widget, ServiceError> {
        self.widgets
            .get_all()?
            .into_iter()
            .find(|w| w.slug == slug)
            .ok_or_else(|| ServiceError::NotFound(format!("widget {}", slug)))
    }

    pub fn create(&self, slug: &str, name: &str) -> Result<u64, ServiceError> {
        if slug.is_empty() {
            return Err(ServiceError::MissingField("slug"));
        }
        if self.find(slug).is_ok() {
            return Err(ServiceError::Conflict(format!("widget {}", slug)));
        }
        Ok(self.widgets.add(Widget {
            id: 0,
            slug: slug.to_string(),
            name: name.to_string(),
        })?)
    }

    pub fn rename(&self, slug: &str, name: &str) -> Result<Widget, ServiceError> {
        let mut widget = self.find(slug)?;
        widget.name = name.to_string();
        self.widgets.set(widget.clone())?;
        Ok(widget)
    }

    pub fn parts(&self, slug: &str) -> Result<Vec<Part>, ServiceError> {
        Ok(self
            .parts
            .get_all()?
            .into_iter()
            .filter(|p| p.widget == slug)
            .collect())
    }

    pub fn add_part(&self, slug: &str, name: &str) -> Result<u64, ServiceError> {
        self.find(slug)?;
        Ok(self.parts.add(Part {
            id: 0,
            widget: slug.to_string(),
            name: name.to_string(),
        })?)
    }

    fn part(&self, slug: &str, id: u64) -> Result<Part, ServiceError> {
        self.parts
            .get(id)?
            .filter(|p| p.widget == slug)
            .ok_or_else(|| ServiceError::NotFound(format!("part {} of widget {}", id, slug)))
    }

    pub fn update_part(&self, slug: &str, id: u64, name: &str) -> Result<Part, ServiceError> {
        let mut part = self.part(slug, id)?;
        part.name = name.to_string();
        self.parts.set(part.clone())?;
        Ok(part)
    }

    /// Deleting a missing part succeeds.
    pub fn delete_part(&self, slug: &str, id: u64) -> Result<(), ServiceError> {
        if self.part(slug, id).is_ok() {
            self.parts.del(id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WidgetForm {
    pub slug: String,
    pub name: String,
}

pub fn routes(mux: &mut Muxer<AppState>) -> Result<(), RouteError> {
    mux.get("/", home)?
        .get("/contact", contact)?
        .get("/api/widgets", api_get_widgets)?
        .post("/api/widgets", api_create_widget)?
        .post("/api/widgets/:slug", api_update_widget)?
        .post("/api/widgets/:slug/parts", api_create_widget_part)?
        .post("/api/widgets/:slug/parts/:id/update", api_update_widget_part)?
        .post("/api/widgets/:slug/parts/:id/delete", api_delete_widget_part)?
        .get("/:slug", widget)?
        .get("/:slug/admin", widget_admin)?
        .post("/:slug/image", widget_image)?;
    Ok(())
}

fn slug(params: &Params) -> &str {
    params.get("slug").unwrap_or_default()
}

fn part_id(params: &Params) -> Result<u64, AppError> {
    params
        .get_parsed("id")
        .ok_or_else(|| AppError::BadRequest("part id must be a number".to_string()))
}

async fn home() -> &'static str {
    "home\n"
}

async fn contact() -> &'static str {
    "contact\n"
}

async fn api_get_widgets(State(state): State<AppState>) -> Result<Json<Vec<Widget>>, AppError> {
    Ok(Json(state.widgets.list()?))
}

async fn api_create_widget(
    State(state): State<AppState>,
    Form(form): Form<WidgetForm>,
) -> Result<String, AppError> {
    let id = state.widgets.create(&form.slug, &form.name)?;
    Ok(format!("apiCreateWidget {} {}\n", form.slug, id))
}

async fn api_update_widget(
    State(state): State<AppState>,
    params: Params,
    Form(form): Form<WidgetForm>,
) -> Result<String, AppError> {
    let slug = slug(&params);
    state.widgets.rename(slug, &form.name)?;
    Ok(format!("apiUpdateWidget {}\n", slug))
}

async fn api_create_widget_part(
    State(state): State<AppState>,
    params: Params,
    Form(form): Form<WidgetForm>,
) -> Result<String, AppError> {
    let slug = slug(&params);
    let id = state.widgets.add_part(slug, &form.name)?;
    Ok(format!("apiCreateWidgetPart {} {}\n", slug, id))
}

async fn api_update_widget_part(
    State(state): State<AppState>,
    params: Params,
    Form(form): Form<WidgetForm>,
) -> Result<String, AppError> {
    let slug = slug(&params);
    let id = part_id(&params)?;
    state.widgets.update_part(slug, id, &form.name)?;
    Ok(format!("apiUpdateWidgetPart {} {}\n", slug, id))
}

async fn api_delete_widget_part(
    State(state): State<AppState>,
    params: Params,
) -> Result<String, AppError> {
    let slug = slug(&params);
    let id = part_id(&params)?;
    state.widgets.delete_part(slug, id)?;
    Ok(format!("apiDeleteWidgetPart {} {}\n", slug, id))
}

async fn widget(params: Params) -> String {
    format!("widget {}\n", slug(&params))
}

async fn widget_admin(params: Params) -> String {
    format!("widgetAdmin {}\n", slug(&params))
}

async fn widget_image(params: Params) -> String {
    format!("widgetImage {}\n", slug(&params))
}
