//! Per-scan shared state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// State shared by every checker taking part in one scan.
///
/// Cloning a `ScanContext` hands out another reference to the same scan;
/// members of a concurrent group each hold one. The context does not
/// serialize access for checkers: the lookup cache takes its own lock per
/// call and nothing else here is mutable.
#[derive(Debug, Clone)]
pub struct ScanContext {
    inner: Arc<ScanState>,
}

#[derive(Debug)]
struct ScanState {
    started: Instant,
    /// (record type, name) -> answers
    lookups: Mutex<HashMap<(String, String), Vec<String>>>,
}

impl ScanContext {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ScanState {
                started: Instant::now(),
                lookups: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Time since this scan began.
    pub fn elapsed(&self) -> Duration {
        self.inner.started.elapsed()
    }

    /// Answers cached by an earlier lookup in this scan, if any.
    pub fn cached_lookup(&self, record_type: &str, name: &str) -> Option<Vec<String>> {
        let lookups = self
            .inner
            .lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        lookups
            .get(&(record_type.to_ascii_uppercase(), name.to_ascii_lowercase()))
            .cloned()
    }

    /// Cache answers for the rest of the scan. A later store replaces an
    /// earlier one.
    pub fn store_lookup(&self, record_type: &str, name: &str, answers: Vec<String>) {
        let mut lookups = self
            .inner
            .lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        lookups.insert(
            (record_type.to_ascii_uppercase(), name.to_ascii_lowercase()),
            answers,
        );
    }

    /// Whether two handles refer to the same scan.
    pub fn same_scan(&self, other: &ScanContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for ScanContext {
    fn default() -> Self {
        Self::new()
    }
}
