//! Aligned time-series bundles
//!
//! A bundle holds a shared time grid (`"time"`) plus one elapsed-time series
//! per clock, in registration order. Every series has the grid's length.

use serde::Serialize;

use crate::{ClockKind, SandboxError, SandboxResult};

/// Key under which the shared time grid is exposed
pub const TIME_KEY: &str = "time";

/// Default key for the clock registered at `index`
pub fn default_key(index: usize) -> String {
    format!("clock_{}", index)
}

/// One named series in a bundle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesEntry {
    /// Lookup key
    pub key: String,
    /// Model of the clock that produced the series, if any
    pub kind: Option<ClockKind>,
    /// Samples, aligned with the bundle's time grid
    pub values: Vec<f64>,
}

/// Time-series bundle sharing a single time grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    time: Vec<f64>,
    entries: Vec<SeriesEntry>,
}

impl TimeSeries {
    /// Create an empty bundle over an existing grid
    pub fn new(time: Vec<f64>) -> Self {
        TimeSeries {
            time,
            entries: Vec::new(),
        }
    }

    /// Create an empty bundle over the grid `0, dt, 2·dt, …, n_steps·dt`
    pub fn uniform(n_steps: usize, dt: f64) -> Self {
        let time = (0..=n_steps).map(|k| k as f64 * dt).collect();
        Self::new(time)
    }

    /// Get the shared time grid
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Number of samples per series
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Check if the grid is empty
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Number of clock series (the grid is not counted)
    pub fn series_count(&self) -> usize {
        self.entries.len()
    }

    /// Append a series under `key`
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        kind: Option<ClockKind>,
        values: Vec<f64>,
    ) -> SandboxResult<()> {
        let key = key.into();
        if key == TIME_KEY {
            return Err(SandboxError::invalid_argument(format!(
                "'{}' is reserved for the time grid",
                TIME_KEY
            )));
        }
        if self.contains(&key) {
            return Err(SandboxError::invalid_argument(format!(
                "duplicate series key '{}'",
                key
            )));
        }
        if values.len() != self.time.len() {
            return Err(SandboxError::LengthMismatch {
                expected: self.time.len(),
                actual: values.len(),
            });
        }

        self.entries.push(SeriesEntry { key, kind, values });
        Ok(())
    }

    /// Look up a series by key; `"time"` yields the grid
    pub fn get(&self, key: &str) -> Option<&[f64]> {
        if key == TIME_KEY {
            return Some(&self.time);
        }
        self.entry(key).map(|e| e.values.as_slice())
    }

    /// Look up a series by key, failing on unknown keys
    pub fn series(&self, key: &str) -> SandboxResult<&[f64]> {
        self.get(key)
            .ok_or_else(|| SandboxError::invalid_argument(format!("unknown series key '{}'", key)))
    }

    /// Get the entry stored under `key`
    pub fn entry(&self, key: &str) -> Option<&SeriesEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Get the clock kind behind `key`
    pub fn kind(&self, key: &str) -> Option<ClockKind> {
        self.entry(key).and_then(|e| e.kind)
    }

    /// Check if a clock series exists under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    /// Clock series keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// All clock entries in registration order
    pub fn entries(&self) -> &[SeriesEntry] {
        &self.entries
    }

    /// Key of the first ideal reference series, if one was registered
    pub fn reference_key(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.kind.map_or(false, |k| k.is_reference()))
            .map(|e| e.key.as_str())
    }
}
