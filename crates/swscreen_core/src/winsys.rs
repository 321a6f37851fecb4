//! Window-system integration handle

use std::fmt;
use std::sync::Arc;

/// Presentation backend supplied by the outer framework
pub trait SwWinsys: fmt::Debug + Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &str;
}

/// Shared handle to the caller's window system. Cloning it never transfers
/// ownership of the underlying presentation surface.
pub type WinsysHandle = Arc<dyn SwWinsys>;
