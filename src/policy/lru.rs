//! LRU Tracker Module
//!
//! Bounded recency ordering used to cap memoized header parses.

use std::collections::VecDeque;

// == LRU Tracker ==
/// Tracks access order for a fixed number of keys.
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug)]
pub struct LruTracker<K> {
    order: VecDeque<K>,
    capacity: usize,
}

impl<K: PartialEq> LruTracker<K> {
    // == Constructor ==
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    // == Touch ==
    /// Moves `key` to the front, inserting it if new.
    ///
    /// Returns the key pushed out when the tracker grows past capacity.
    pub fn touch(&mut self, key: K) -> Option<K> {
        self.remove(&key);
        self.order.push_front(key);
        if self.order.len() > self.capacity {
            self.order.pop_back()
        } else {
            None
        }
    }

    // == Remove ==
    pub fn remove(&mut self, key: &K) {
        self.order.retain(|k| k != key);
    }

    pub fn peek_oldest(&self) -> Option<&K> {
        self.order.back()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.order.iter().any(|k| k == key)
    }
}
