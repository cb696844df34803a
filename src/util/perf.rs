//! Named performance counters.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Counter bumped when a gprim's points are found to vary over time.
pub const GPRIM_POINTS_VARYING: &str = "gprimPointsVarying";
/// Counter bumped when a primvar is found to vary over time.
pub const PRIMVAR_VARYING: &str = "primvarVarying";
/// Counter bumped when a transform is found to vary over time.
pub const TRANSFORM_VARYING: &str = "transformVarying";
/// Counter bumped when visibility is found to vary over time.
pub const VISIBILITY_VARYING: &str = "visibilityVarying";
/// Counter bumped when instance indices are found to vary over time.
pub const INSTANCE_INDICES_VARYING: &str = "instanceIndicesVarying";

/// Thread-safe set of named `u64` counters.
#[derive(Debug, Default)]
pub struct PerfCounters {
    counters: Mutex<HashMap<String, u64>>,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment a counter, creating it at zero first if needed.
    pub fn incr(&self, name: &str) {
        let mut counters = self.counters.lock();
        let value = counters.entry(name.to_string()).or_insert(0);
        *value += 1;
        tracing::trace!(counter = name, value = *value, "perf counter");
    }

    /// Current value of a counter (0 if never bumped).
    pub fn get(&self, name: &str) -> u64 {
        self.counters.lock().get(name).copied().unwrap_or(0)
    }

    pub fn reset(&self) {
        self.counters.lock().clear();
    }

    /// Snapshot all counters, sorted by name.
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let mut all: Vec<_> = self
            .counters
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        all.sort();
        all
    }
}
