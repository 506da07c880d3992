//! HTML form builder.
//!
//! Renders Bootstrap-style forms from a list of fields through an embedded
//! Handlebars template. Used as the fallback markup when no page template
//! is loaded.

use std::sync::OnceLock;

use handlebars::Handlebars;
use serde::Serialize;

use crate::templates::TemplateError;

const FORM: &str = "form";

const FORM_TEMPLATE: &str = r#"<div class="row row-pad">
  <br>
  <legend>{{name}}</legend>
  <hr>
  <form id="{{form_id}}" action="{{action}}" method="post" novalidate="novalidate" autocomplete="off">
{{#each fields}}
    <div class="mb-3">
      {{#if visible}}<label for="{{name}}" class="form-label">{{label}}</label>{{/if}}
      <input type="{{kind}}" class="form-control" name="{{name}}" id="{{id}}"{{#if placeholder}} placeholder="{{placeholder}}"{{/if}}{{#if required}} required{{/if}} aria-describedby="{{id}}-help">
      {{#if help_text}}<div id="{{id}}-help" class="form-text">{{help_text}}</div>{{/if}}
    </div>
{{/each}}
    <div class="d-grid gap-2 d-md-flex justify-content-md-end">
      <button type="submit" class="btn btn-success me-md-2">{{submit_text}}</button>
      {{#if has_cancel}}<button type="reset" class="btn btn-danger me-md-2">Cancel</button>{{/if}}
    </div>
  </form>
</div>
"#;

fn registry() -> &'static Handlebars<'static> {
    static REGISTRY: OnceLock<Handlebars<'static>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut registry = Handlebars::new();
        if let Err(e) = registry.register_template_string(FORM, FORM_TEMPLATE) {
            tracing::error!(error = %e, "Failed to register form template");
        }
        registry
    })
}

/// Input kinds a field can render as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldType {
    Hidden,
    #[default]
    Text,
    Email,
    Integer,
    Password,
}

impl FieldType {
    /// The HTML `type` attribute.
    pub fn as_html(&self) -> &'static str {
        match self {
            FieldType::Hidden => "hidden",
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Integer => "number",
            FieldType::Password => "password",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Field {
    pub id: String,
    pub name: String,
    pub kind: FieldType,
    pub help_text: String,
    pub placeholder: String,
    pub required: bool,
}

impl Field {
    pub fn new(name: &str, kind: FieldType) -> Self {
        Self {
            id: name.to_lowercase(),
            name: name.to_string(),
            kind,
            ..Self::default()
        }
    }

    pub fn help(mut self, text: &str) -> Self {
        self.help_text = text.to_string();
        self
    }

    pub fn placeholder(mut self, text: &str) -> Self {
        self.placeholder = text.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub name: String,
    pub action: String,
    pub submit_text: String,
    pub has_cancel: bool,
    pub fields: Vec<Field>,
}

#[derive(Serialize)]
struct FieldView<'a> {
    id: String,
    name: String,
    label: String,
    kind: &'static str,
    visible: bool,
    help_text: &'a str,
    placeholder: &'a str,
    required: bool,
}

#[derive(Serialize)]
struct FormView<'a> {
    form_id: String,
    name: &'a str,
    action: &'a str,
    submit_text: &'a str,
    has_cancel: bool,
    fields: Vec<FieldView<'a>>,
}

impl Form {
    /// An empty `submit_text` becomes "Submit".
    pub fn new(name: &str, action: &str, submit_text: &str, has_cancel: bool, fields: Vec<Field>) -> Self {
        let submit_text = if submit_text.is_empty() { "Submit" } else { submit_text };
        Self {
            name: name.to_string(),
            action: action.to_string(),
            submit_text: submit_text.to_string(),
            has_cancel,
            fields,
        }
    }

    pub fn render(&self) -> Result<String, TemplateError> {
        let view = FormView {
            form_id: format!("{}-form", self.name.to_lowercase().replace(' ', "-")),
            name: &self.name,
            action: &self.action,
            submit_text: &self.submit_text,
            has_cancel: self.has_cancel,
            fields: self
                .fields
                .iter()
                .map(|field| FieldView {
                    id: field.id.to_lowercase(),
                    name: field.name.to_lowercase(),
                    label: title_case(&field.name),
                    kind: field.kind.as_html(),
                    visible: field.kind != FieldType::Hidden,
                    help_text: &field.help_text,
                    placeholder: &field.placeholder,
                    required: field.required,
                })
                .collect(),
        };

        registry()
            .render(FORM, &view)
            .map_err(|source| TemplateError::Render {
                name: FORM.to_string(),
                source: Box::new(source),
            })
    }
}

fn title_case(text: &str) -> String {
    text.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
