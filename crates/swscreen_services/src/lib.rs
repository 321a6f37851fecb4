//! swscreen Services Layer
//!
//! Configuration inputs for screen selection: environment options and the
//! optional settings file.

pub mod options;
pub mod settings;

pub use options::{debug_get_bool_option, debug_get_option, DebugOptions, DriverOptions};
pub use settings::{HardwareSettings, Settings, SettingsError};
