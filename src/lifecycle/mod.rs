//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → storage backend → auth seed → templates → Muxer::build
//!
//! Shutdown (shutdown.rs):
//!     trigger() → server drains → session GC exits → watcher dropped
//!
//! Signals (signals.rs):
//!     Ctrl+C → trigger()
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::forward_ctrl_c;
pub use startup::{build_app, StartupError};
