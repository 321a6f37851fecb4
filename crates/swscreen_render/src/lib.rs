//! swscreen Render
//!
//! Screen selection with automatic fallbacks:
//! - Candidate list from the environment and the compiled-in backends
//! - First-success resolution that never substitutes for an explicit request
//! - Device acquisition for the render-only hardware backend
//! - Optional diagnostic proxies around the selected screen

pub mod acquire;
pub mod debug;
pub mod factory;
pub mod renderonly;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use acquire::{acquire, AcquireError, Acquired, DeviceIndex};
pub use debug::{debug_screen_wrap, NoopScreen, TraceScreen};
pub use factory::{FreedrenoParams, Rasterizers, ScreenFactory};
pub use renderonly::{RenderOnly, RenderOnlyError, RenderOnlyScanout, ResourceInfo};
pub use resolver::{candidates, resolve};

pub use swscreen_core::{Backend, Screen, ScreenConfig, ScreenHandle, SwWinsys, WinsysHandle};
