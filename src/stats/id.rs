//! Process-unique identifiers for registry records

use std::sync::atomic::{AtomicI64, Ordering};

/// Monotonic id source shared by every vhost and stream record
///
/// Seeded from the process id so two server instances on the same host are
/// unlikely to hand out overlapping ids.
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicI64,
}

impl IdGenerator {
    /// Create a generator seeded from the current process id
    pub fn new() -> Self {
        Self::with_seed(std::process::id() as i64 * 3)
    }

    /// Create a generator whose first id is `seed`
    pub fn with_seed(seed: i64) -> Self {
        Self {
            next: AtomicI64::new(seed),
        }
    }

    /// Take the next id
    pub fn next_id(&self) -> i64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
