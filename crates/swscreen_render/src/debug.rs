//! Diagnostic proxies
//!
//! Layered over a created screen according to [`DebugOptions`]: tracing
//! innermost, no-op outermost. With no option set the screen is returned
//! untouched.

use swscreen_core::{Screen, ScreenHandle};
use swscreen_services::DebugOptions;

/// Logs every query made against the wrapped screen
#[derive(Debug)]
pub struct TraceScreen {
    inner: ScreenHandle,
    destination: String,
}

impl TraceScreen {
    pub fn new(inner: ScreenHandle, destination: impl Into<String>) -> Self {
        let destination = destination.into();
        tracing::info!(screen = inner.name(), %destination, "tracing screen");
        Self { inner, destination }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }
}

impl Screen for TraceScreen {
    fn name(&self) -> &str {
        let name = self.inner.name();
        tracing::trace!(target: "swscreen::trace", call = "name", result = name);
        name
    }

    fn vendor(&self) -> &str {
        let vendor = self.inner.vendor();
        tracing::trace!(target: "swscreen::trace", call = "vendor", result = vendor);
        vendor
    }

    fn wrapped(&self) -> Option<&dyn Screen> {
        Some(self.inner.as_ref())
    }
}

/// Keeps the wrapped screen's identity while discarding rendering work
#[derive(Debug)]
pub struct NoopScreen {
    inner: ScreenHandle,
}

impl NoopScreen {
    pub fn new(inner: ScreenHandle) -> Self {
        Self { inner }
    }
}

impl Screen for NoopScreen {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn vendor(&self) -> &str {
        "noop"
    }

    fn wrapped(&self) -> Option<&dyn Screen> {
        Some(self.inner.as_ref())
    }
}

/// Apply the proxies selected by `options`. The returned handle is the sole
/// owner of `screen`.
pub fn debug_screen_wrap(screen: ScreenHandle, options: &DebugOptions) -> ScreenHandle {
    let screen: ScreenHandle = match &options.trace {
        Some(destination) => Box::new(TraceScreen::new(screen, destination.clone())),
        None => screen,
    };
    if options.noop {
        Box::new(NoopScreen::new(screen)) as ScreenHandle
    } else {
        screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestScreen;

    fn base() -> ScreenHandle {
        Box::new(TestScreen("softpipe".into()))
    }

    #[test]
    fn no_options_pass_through() {
        let screen = debug_screen_wrap(base(), &DebugOptions::default());
        assert_eq!(screen.name(), "softpipe");
        assert!(screen.wrapped().is_none());
    }

    #[test]
    fn trace_forwards_queries() {
        let options = DebugOptions {
            trace: Some("stderr".into()),
            noop: false,
        };
        let screen = debug_screen_wrap(base(), &options);
        assert_eq!(screen.name(), "softpipe");
        assert_eq!(screen.vendor(), "softpipe");
        assert!(screen.wrapped().unwrap().wrapped().is_none());
    }

    #[test]
    fn noop_wraps_outermost() {
        let options = DebugOptions {
            trace: Some("stderr".into()),
            noop: true,
        };
        let screen = debug_screen_wrap(base(), &options);
        assert_eq!(screen.vendor(), "noop");
        assert_eq!(screen.name(), "softpipe");
        let trace = screen.wrapped().unwrap();
        assert_eq!(trace.vendor(), "softpipe");
        assert_eq!(trace.wrapped().unwrap().name(), "softpipe");
    }
}
