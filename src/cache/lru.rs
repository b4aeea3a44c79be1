//! LRU Map Module
//!
//! Fixed-capacity map with access-order eviction, shared by the in-memory backends.

use std::collections::HashMap;
use std::hash::Hash;

/// Sentinel for "no neighbour" in the intrusive list.
const NIL: usize = usize::MAX;

/// Upper bound on eager index allocation, so huge capacities stay cheap until used.
const PREALLOC_LIMIT: usize = 4096;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

// == LRU Map ==
/// Bounded map that evicts the least recently used entry on overflow.
///
/// Nodes live in an index arena and form a doubly linked list:
/// - `head` = most recently used
/// - `tail` = least recently used
///
/// `get` and `insert` move the touched key to the head. `peek` does not.
#[derive(Debug)]
pub struct LruMap<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    index: HashMap<K, usize>,
    head: usize,
    tail: usize,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V> LruMap<K, V> {
    // == Constructor ==
    /// Creates an empty map holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let hint = (capacity.saturating_mul(4) / 3 + 1).min(PREALLOC_LIMIT);
        Self {
            slots: Vec::with_capacity(hint),
            free: Vec::new(),
            index: HashMap::with_capacity(hint),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    // == Get ==
    /// Returns the value and marks the key as most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.touch(idx);
        Some(&self.node(idx).value)
    }

    /// Returns the value without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        Some(&self.node(idx).value)
    }

    // == Insert ==
    /// Inserts or overwrites a key and marks it as most recently used.
    ///
    /// Returns the entry evicted to make room, if any. Overwrites never evict.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.index.get(&key) {
            self.node_mut(idx).value = value;
            self.touch(idx);
            return None;
        }

        let evicted = if self.index.len() >= self.capacity {
            self.pop_lru()
        } else {
            None
        };

        let idx = self.alloc(key.clone(), value);
        self.attach_front(idx);
        self.index.insert(key, idx);
        evicted
    }

    // == Remove ==
    /// Removes a key, returning its value if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.index.remove(key)?;
        Some(self.release(idx).value)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        if self.tail == NIL {
            return None;
        }
        let node = self.release(self.tail);
        self.index.remove(&node.key);
        Some((node.key, node.value))
    }

    /// The least recently used entry, without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        if self.tail == NIL {
            return None;
        }
        let node = self.node(self.tail);
        Some((&node.key, &node.value))
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    // == Retain ==
    /// Drops every entry for which `keep` returns false. Returns how many were dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut doomed = Vec::new();
        let mut cursor = self.head;
        while cursor != NIL {
            let node = self.node(cursor);
            if !keep(&node.key, &node.value) {
                doomed.push(cursor);
            }
            cursor = node.next;
        }

        for &idx in &doomed {
            let node = self.release(idx);
            self.index.remove(&node.key);
        }
        doomed.len()
    }

    /// Iterates from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            map: self,
            cursor: self.head,
        }
    }

    // == List Plumbing ==
    fn node(&self, idx: usize) -> &Node<K, V> {
        self.slots[idx]
            .as_ref()
            .expect("LRU index points at a vacant slot")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        self.slots[idx]
            .as_mut()
            .expect("LRU index points at a vacant slot")
    }

    fn alloc(&mut self, key: K, value: V) -> usize {
        let node = Node {
            key,
            value,
            prev: NIL,
            next: NIL,
        };
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) -> Node<K, V> {
        self.detach(idx);
        self.free.push(idx);
        self.slots[idx]
            .take()
            .expect("LRU index points at a vacant slot")
    }

    fn touch(&mut self, idx: usize) {
        if self.head != idx {
            self.detach(idx);
            self.attach_front(idx);
        }
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };

        if prev == NIL {
            self.head = next;
        } else {
            self.node_mut(prev).next = next;
        }

        if next == NIL {
            self.tail = prev;
        } else {
            self.node_mut(next).prev = prev;
        }
    }

    fn attach_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = NIL;
            node.next = old_head;
        }

        if old_head == NIL {
            self.tail = idx;
        } else {
            self.node_mut(old_head).prev = idx;
        }
        self.head = idx;
    }
}

// == Iterator ==
/// Iterator over an [`LruMap`] in recency order.
pub struct Iter<'a, K, V> {
    map: &'a LruMap<K, V>,
    cursor: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let node = self.map.slots.get(self.cursor)?.as_ref()?;
        self.cursor = node.next;
        Some((&node.key, &node.value))
    }
}
