//! Screen handles
//!
//! A screen is the opaque, fully configured instance of one backend. The
//! outer framework owns what sits behind it; this crate only moves it around.

use std::fmt;

/// A ready-to-use rendering backend instance
pub trait Screen: fmt::Debug + Send {
    /// Short identifier of the driver behind this screen.
    fn name(&self) -> &str;

    /// Human-readable vendor string. Defaults to the driver name.
    fn vendor(&self) -> &str {
        self.name()
    }

    /// The screen behind a diagnostic proxy, if this is one.
    fn wrapped(&self) -> Option<&dyn Screen> {
        None
    }
}

/// Sole owner of a created screen. A debug proxy replaces it, it never
/// shares it.
pub type ScreenHandle = Box<dyn Screen>;

/// Optional creation parameters handed to a driver entry point
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenConfig {
    /// Driver options, as `key=value` pairs
    pub options: Option<Vec<(String, String)>>,
    /// Raw driconf-style option text
    pub options_info: Option<String>,
}

impl ScreenConfig {
    pub fn is_empty(&self) -> bool {
        self.options.is_none() && self.options_info.is_none()
    }
}
