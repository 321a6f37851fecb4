//! Per-backend selection tallies

use crate::Stage;
use std::collections::BTreeMap;

/// Attempts and creations, keyed by backend name
#[derive(Debug, Default)]
pub struct Counter {
    tallies: BTreeMap<(String, Stage), usize>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, backend: &str, stage: Stage) {
        *self.tallies.entry((backend.to_string(), stage)).or_insert(0) += 1;
    }

    pub fn get(&self, backend: &str, stage: Stage) -> usize {
        self.tallies
            .get(&(backend.to_string(), stage))
            .copied()
            .unwrap_or(0)
    }

    /// Attempts on `backend` that produced no screen
    pub fn failures(&self, backend: &str) -> usize {
        self.get(backend, Stage::Attempt)
            .saturating_sub(self.get(backend, Stage::Created))
    }

    pub fn reset_all(&mut self) {
        self.tallies.clear();
    }

    /// Tallies in backend-name order, attempts before creations.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Stage, usize)> + '_ {
        self.tallies
            .iter()
            .map(|((backend, stage), count)| (backend.as_str(), *stage, *count))
    }
}
