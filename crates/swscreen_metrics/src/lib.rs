//! swscreen Metrics - selection bookkeeping
//!
//! Named counters for backend attempts and successes that compile away in
//! production builds.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use swscreen_metrics::{Counter, Stage};
//!
//! let mut counter = Counter::new();
//! counter.record("softpipe", Stage::Attempt);
//! println!("softpipe attempts: {}", counter.get("softpipe", Stage::Attempt));
//! ```

#[cfg(feature = "metrics")]
mod counter;

#[cfg(feature = "metrics")]
pub use counter::Counter;

/// Point in screen creation a tally is taken at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// The backend's entry point was about to run
    Attempt,
    /// The entry point returned a screen
    Created,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Attempt => "attempt",
            Stage::Created => "created",
        }
    }
}

/// Execute code only when metrics are enabled
#[macro_export]
macro_rules! metrics {
    ($($tt:tt)*) => {
        #[cfg(feature = "metrics")]
        {
            $($tt)*
        }
    };
}

// ============================================================================
// No-op stub when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn record(&mut self, _backend: &str, _stage: Stage) {}
    pub fn get(&self, _backend: &str, _stage: Stage) -> usize { 0 }
    pub fn failures(&self, _backend: &str) -> usize { 0 }
    pub fn reset_all(&mut self) {}
    pub fn iter(&self) -> impl Iterator<Item = (&str, Stage, usize)> + '_ {
        std::iter::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Counter, Stage};

    #[test]
    fn counter_api_is_available_in_every_build() {
        let mut counter = Counter::new();
        counter.record("llvmpipe", Stage::Attempt);
        counter.reset_all();
        assert_eq!(counter.get("llvmpipe", Stage::Attempt), 0);
        assert_eq!(counter.iter().count(), 0);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn tallies_attempts_and_creations_per_backend() {
        let mut counter = Counter::new();
        counter.record("softpipe", Stage::Attempt);
        counter.record("llvmpipe", Stage::Attempt);
        counter.record("softpipe", Stage::Attempt);
        counter.record("softpipe", Stage::Created);
        assert_eq!(counter.get("softpipe", Stage::Attempt), 2);
        assert_eq!(counter.failures("softpipe"), 1);
        assert_eq!(counter.failures("llvmpipe"), 1);
        assert_eq!(counter.get("zink", Stage::Created), 0);

        let seen: Vec<_> = counter.iter().collect();
        assert_eq!(
            seen,
            [
                ("llvmpipe", Stage::Attempt, 1),
                ("softpipe", Stage::Attempt, 2),
                ("softpipe", Stage::Created, 1),
            ]
        );
    }

    #[cfg(not(feature = "metrics"))]
    #[test]
    fn disabled_counter_records_nothing() {
        let mut counter = Counter::new();
        counter.record("softpipe", Stage::Created);
        assert_eq!(counter.failures("softpipe"), 0);
        assert!(counter.iter().next().is_none());
    }
}
