//! Simple ORM: SQL statements generated from tagged model fields.
//!
//! # Data Flow
//! ```text
//! sorm_model! struct (fields tagged "column[,pk]")
//!     → model.rs (Model::fields: name, kind, value, tag)
//!     → table.rs (Table::from_model: lower-cased name, pk, column affinities)
//!     → CREATE / SELECT / INSERT / UPDATE / DELETE text + bound values
//! ```
//!
//! # Design Decisions
//! - Column types are SQLite affinities of the mapped Rust kind
//! - Statements use `?` placeholders; values travel separately
//! - Only the generator lives here; executing statements is storage's job

pub mod model;
pub mod table;
pub mod types;

pub use model::{Model, ModelField};
pub use table::{Column, Table};
pub use types::{FieldKind, SqlKind, SqlType, SqlValue};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SormError {
    #[error("table {0} has no primary key")]
    NoPrimaryKey(String),
}
