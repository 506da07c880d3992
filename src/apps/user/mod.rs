//! User registration app.
//!
//! # Data Flow
//! ```text
//! controller (HTTP handlers)
//!     → UserService (validation, uniqueness)
//!     → UserRepository (queries)
//!     → Arc<dyn Dao<User>> (memory or sqlite)
//! ```

pub mod controller;
pub mod model;
pub mod repository;
pub mod service;

pub use controller::routes;
pub use model::User;
pub use repository::UserRepository;
pub use service::{wire_user, UserForm, UserService};
