//! Environment options
//!
//! Lookups go through a caller-supplied function so the process environment
//! is only touched by `from_env`.

/// Environment variable naming the requested backend
pub const GALLIUM_DRIVER: &str = "GALLIUM_DRIVER";
/// Environment variable forcing software rendering
pub const LIBGL_ALWAYS_SOFTWARE: &str = "LIBGL_ALWAYS_SOFTWARE";
/// Environment variable enabling the tracing proxy
pub const GALLIUM_TRACE: &str = "GALLIUM_TRACE";
/// Environment variable enabling the no-op proxy
pub const GALLIUM_NOOP: &str = "GALLIUM_NOOP";

/// String option, or `default` when unset.
pub fn debug_get_option<F>(lookup: F, name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).unwrap_or_else(|| default.to_string())
}

/// Boolean option. Recognized spellings are case-insensitive; anything else
/// falls back to `default`.
pub fn debug_get_bool_option<F>(lookup: F, name: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => parse_bool(&value).unwrap_or(default),
        None => default,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "0" | "n" | "no" | "f" | "false" => Some(false),
        "1" | "y" | "yes" | "t" | "true" => Some(true),
        _ => None,
    }
}

/// Which diagnostic proxy, if any, wraps created screens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugOptions {
    /// Trace destination named by `GALLIUM_TRACE`; enables the tracing proxy
    pub trace: Option<String>,
    /// Replace rendering with no-ops
    pub noop: bool,
}

impl DebugOptions {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let trace = debug_get_option(&lookup, GALLIUM_TRACE, "");
        Self {
            trace: (!trace.is_empty()).then_some(trace),
            noop: debug_get_bool_option(&lookup, GALLIUM_NOOP, false),
        }
    }
}

/// Backend-selection inputs read from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverOptions {
    /// Explicit backend request; empty means no preference
    pub driver_override: String,
    /// Skip hardware and hardware-emulating backends
    pub only_software: bool,
    pub debug: DebugOptions,
}

impl DriverOptions {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            driver_override: debug_get_option(&lookup, GALLIUM_DRIVER, ""),
            only_software: debug_get_bool_option(&lookup, LIBGL_ALWAYS_SOFTWARE, false),
            debug: DebugOptions::from_lookup(&lookup),
        }
    }

    /// Request a specific backend.
    pub fn with_override(mut self, driver: impl Into<String>) -> Self {
        self.driver_override = driver.into();
        self
    }
}
