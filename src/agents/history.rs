// Per-agent append-only logs
//
// Unbounded unless a capacity is configured, in which case the oldest
// entries are dropped ring-buffer style.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    capacity: Option<usize>,
    evicted: u64,
}

impl<T: Clone> BoundedLog<T> {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            evicted: 0,
        }
    }

    pub fn push(&mut self, entry: T) {
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                self.evicted += 1;
                return;
            }
            while self.entries.len() >= capacity {
                self.entries.pop_front();
                self.evicted += 1;
            }
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries dropped to respect the capacity
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }

    /// The last `n` entries, oldest first
    pub fn tail(&self, n: usize) -> Vec<T> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_log_keeps_everything() {
        let mut log = BoundedLog::new(None);
        for i in 0..1_000 {
            log.push(i);
        }
        assert_eq!(log.len(), 1_000);
        assert_eq!(log.evicted(), 0);
    }

    #[test]
    fn bounded_log_drops_oldest() {
        let mut log = BoundedLog::new(Some(3));
        for i in 0..5 {
            log.push(i);
        }
        assert_eq!(log.snapshot(), vec![2, 3, 4]);
        assert_eq!(log.evicted(), 2);
    }

    #[test]
    fn tail_returns_most_recent_in_order() {
        let mut log = BoundedLog::new(None);
        for i in 0..10 {
            log.push(i);
        }
        assert_eq!(log.tail(3), vec![7, 8, 9]);
        assert_eq!(log.tail(50).len(), 10);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut log = BoundedLog::new(Some(0));
        log.push("a");
        assert!(log.is_empty());
        assert_eq!(log.evicted(), 1);
    }
}
