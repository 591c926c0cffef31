//! Multimap of FIFO queues used to match keyed children.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Maps a key to a queue of values. Values queued under the same key come
/// back out in insertion order.
#[derive(Debug, Clone)]
pub struct KeyedIndex<K, V> {
    queues: HashMap<K, VecDeque<V>>,
    size: usize,
}

impl<K, V> Default for KeyedIndex<K, V> {
    fn default() -> Self {
        Self {
            queues: HashMap::new(),
            size: 0,
        }
    }
}

impl<K: Hash + Eq, V> KeyedIndex<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the back of `key`'s queue.
    pub fn queue(&mut self, key: K, value: V) {
        self.queues.entry(key).or_default().push_back(value);
        self.size += 1;
    }

    /// Pop the front of `key`'s queue. An emptied queue is dropped.
    pub fn dequeue(&mut self, key: &K) -> Option<V> {
        let queue = self.queues.get_mut(key)?;
        let value = queue.pop_front()?;
        if queue.is_empty() {
            self.queues.remove(key);
        }
        self.size -= 1;
        Some(value)
    }

    /// The value `dequeue` would return, without removing it.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.queues.get(key).and_then(VecDeque::front)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.queues.contains_key(key)
    }

    /// Total number of queued values across all keys.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for KeyedIndex<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (key, value) in iter {
            index.queue(key, value);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dequeue_is_fifo_per_key() {
        let mut index = KeyedIndex::new();
        index.queue("a", 1);
        index.queue("b", 2);
        index.queue("a", 3);
        assert_eq!(index.len(), 3);

        assert_eq!(index.dequeue(&"a"), Some(1));
        assert_eq!(index.dequeue(&"a"), Some(3));
        assert_eq!(index.dequeue(&"a"), None);
        assert_eq!(index.len(), 1);
        assert!(!index.contains_key(&"a"));
    }

    #[test]
    fn missing_key_is_none() {
        let mut index: KeyedIndex<&str, i32> = KeyedIndex::new();
        assert_eq!(index.dequeue(&"x"), None);
        assert!(index.is_empty());
    }

    #[test]
    fn peek_does_not_consume() {
        let mut index: KeyedIndex<_, _> = [("k", 'x'), ("k", 'y')].into_iter().collect();
        assert_eq!(index.peek(&"k"), Some(&'x'));
        assert_eq!(index.len(), 2);
        assert_eq!(index.dequeue(&"k"), Some('x'));
        assert_eq!(index.peek(&"k"), Some(&'y'));
    }
}
