//! Named monotonic counters for diagnostics.

use std::cell::RefCell;
use std::collections::HashMap;

/// Named counter store. Increment-only between resets.
#[derive(Debug, Default)]
pub struct Counters {
    values: RefCell<HashMap<String, u64>>,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment a counter by one, creating it at zero if absent.
    pub fn incr(&self, name: &str) {
        self.incr_by(name, 1);
    }

    pub fn incr_by(&self, name: &str, amount: u64) {
        let mut values = self.values.borrow_mut();
        *values.entry(name.to_string()).or_insert(0) += amount;
    }

    /// Current value of a counter; absent counters read as zero.
    pub fn get(&self, name: &str) -> u64 {
        self.values.borrow().get(name).copied().unwrap_or(0)
    }

    /// Snapshot of all counters.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.values.borrow().clone()
    }

    pub fn reset(&self) {
        self.values.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_and_reads() {
        let counters = Counters::new();
        counters.incr("cache.hits");
        counters.incr("cache.hits");
        counters.incr_by("delivery.retries", 3);

        assert_eq!(counters.get("cache.hits"), 2);
        assert_eq!(counters.get("delivery.retries"), 3);
        assert_eq!(counters.get("unknown"), 0);
    }

    #[test]
    fn reset_clears_all() {
        let counters = Counters::new();
        counters.incr("a");
        counters.reset();
        assert_eq!(counters.get("a"), 0);
        assert!(counters.snapshot().is_empty());
    }
}
