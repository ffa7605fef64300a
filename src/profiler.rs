//! Statement profiling hook
//!
//! A profiler attached to a connection is told when each `execute` starts and
//! finishes. `MemoryProfiler` keeps the timings in memory.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Receives start/finish notifications around statement execution
pub trait Profiler: Send {
    /// A statement is about to run
    fn start(&mut self, sql: &str);

    /// The statement started last has returned (successfully or not)
    fn finish(&mut self);
}

/// One profiled statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEntry {
    /// SQL text
    pub sql: String,
    /// Wall time spent in the executor
    pub elapsed: Duration,
}

/// In-memory profiler
///
/// Clones share the same entry list, so a clone can be handed to a connection
/// while the caller keeps one to read results.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfiler {
    entries: Arc<Mutex<Vec<ProfileEntry>>>,
    current: Option<(String, Instant)>,
}

impl MemoryProfiler {
    /// Create an empty profiler
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded entries
    pub fn entries(&self) -> Vec<ProfileEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// True if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Profiler for MemoryProfiler {
    fn start(&mut self, sql: &str) {
        self.current = Some((sql.to_string(), Instant::now()));
    }

    fn finish(&mut self) {
        let Some((sql, started)) = self.current.take() else {
            tracing::debug!("profiler finish without matching start");
            return;
        };
        let entry = ProfileEntry {
            sql,
            elapsed: started.elapsed(),
        };
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
