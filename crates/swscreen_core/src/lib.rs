//! swscreen Core
//!
//! Shared vocabulary for screen selection:
//! - Backend identifiers compiled into the build
//! - Opaque screen handles and their configuration
//! - The window-system handle supplied by the outer framework

pub mod backend;
pub mod screen;
pub mod winsys;

pub use backend::{Backend, UnknownBackend};
pub use screen::{Screen, ScreenConfig, ScreenHandle};
pub use winsys::{SwWinsys, WinsysHandle};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
