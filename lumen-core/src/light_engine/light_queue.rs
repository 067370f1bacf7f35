//! Deduplicating FIFO queue for light propagation keys.
//!
//! Uses a power-of-two ring buffer for the queued keys and an `FxHashSet` for the
//! positions seen in the current generation.

use rustc_hash::{FxBuildHasher, FxHashSet};

use super::spatial_key::SpatialKey;

/// A FIFO queue of [`SpatialKey`]s that ignores repeated enqueues of the same position.
///
/// Deduplication is scoped to a *generation*. [`LightQueue::new_generation`] forgets which
/// positions were seen but keeps everything still queued, so a queue can be drained and
/// refilled in the same pass without dropping work that arrived before the drain began.
///
/// The level nibble of a key is not part of its identity: enqueueing the same position
/// with two different levels in one generation keeps only the first.
#[derive(Debug)]
pub struct LightQueue {
    buffer: Box<[SpatialKey]>,
    head: usize,
    len: usize,
    seen: FxHashSet<SpatialKey>,
}

impl LightQueue {
    /// Capacity used by [`LightQueue::new`].
    pub const DEFAULT_CAPACITY: usize = 4096;

    /// Creates a new empty queue with [`LightQueue::DEFAULT_CAPACITY`] slots.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a new queue with room for at least `capacity` keys before growing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        // Power-of-two length so wrapping is a mask.
        let capacity = capacity.max(16).next_power_of_two();
        Self {
            buffer: vec![SpatialKey::encode(0, 0, 0); capacity].into_boxed_slice(),
            head: 0,
            len: 0,
            seen: FxHashSet::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    /// Appends `key` unless its position was already enqueued this generation.
    ///
    /// Returns whether the key was queued.
    #[inline]
    pub fn enqueue(&mut self, key: SpatialKey) -> bool {
        if !self.seen.insert(key.position()) {
            return false;
        }

        if self.len == self.buffer.len() {
            self.grow();
        }

        let mask = self.buffer.len() - 1;
        self.buffer[(self.head + self.len) & mask] = key;
        self.len += 1;
        true
    }

    /// Removes and returns the oldest key.
    ///
    /// Returns `None` if the queue is empty.
    #[inline]
    pub fn dequeue(&mut self) -> Option<SpatialKey> {
        if self.len == 0 {
            return None;
        }

        let key = self.buffer[self.head];
        self.head = (self.head + 1) & (self.buffer.len() - 1);
        self.len -= 1;
        Some(key)
    }

    /// Checks if the queue is empty.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of queued keys.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Starts a new deduplication generation without touching queued keys.
    #[inline]
    pub fn new_generation(&mut self) {
        if !self.seen.is_empty() {
            self.seen.clear();
        }
    }

    /// Doubles the ring buffer, unwrapping the contents to start at index 0.
    fn grow(&mut self) {
        let old_capacity = self.buffer.len();
        let mut new_buffer = vec![SpatialKey::encode(0, 0, 0); old_capacity * 2];

        for (i, slot) in new_buffer.iter_mut().take(self.len).enumerate() {
            *slot = self.buffer[(self.head + i) & (old_capacity - 1)];
        }

        self.buffer = new_buffer.into_boxed_slice();
        self.head = 0;
    }
}

impl Default for LightQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = LightQueue::new();
        let a = SpatialKey::encode(10, 64, 20);
        let b = SpatialKey::encode(11, 64, 20);

        assert!(queue.enqueue(a));
        assert!(queue.enqueue(b));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.dequeue(), Some(a));
        assert_eq!(queue.dequeue(), Some(b));
        assert_eq!(queue.dequeue(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_duplicates_within_generation() {
        let mut queue = LightQueue::new();
        let key = SpatialKey::encode(-3, 5, 9);

        assert!(queue.enqueue(key));
        for _ in 0..10 {
            assert!(!queue.enqueue(key));
        }
        // Same position with a different level is still a duplicate.
        assert!(!queue.enqueue(key.with_level(7)));

        assert_eq!(queue.dequeue(), Some(key));
        assert!(queue.is_empty());

        // Dequeueing alone does not forget the position.
        assert!(!queue.enqueue(key));
    }

    #[test]
    fn test_new_generation_keeps_queued_items() {
        let mut queue = LightQueue::new();
        let a = SpatialKey::encode(1, 1, 1);
        let b = SpatialKey::encode(2, 2, 2);

        queue.enqueue(a);
        queue.enqueue(b);
        queue.new_generation();

        assert_eq!(queue.len(), 2);
        // `a` is still queued but may be enqueued again in the new generation.
        assert!(queue.enqueue(a));
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.dequeue(), Some(a));
        assert_eq!(queue.dequeue(), Some(b));
        assert_eq!(queue.dequeue(), Some(a));
    }

    #[test]
    fn test_growth_preserves_order_across_wrap() {
        let mut queue = LightQueue::with_capacity(16);

        // Move head forward so the contents wrap before growing.
        for i in 0..10 {
            queue.enqueue(SpatialKey::encode(i, 0, 0));
        }
        for _ in 0..10 {
            queue.dequeue();
        }
        queue.new_generation();

        for i in 0..100 {
            assert!(queue.enqueue(SpatialKey::encode(i, 1, 0)));
        }
        for i in 0..100 {
            assert_eq!(queue.dequeue().map(SpatialKey::decode), Some((i, 1, 0)));
        }
        assert!(queue.is_empty());
    }
}
