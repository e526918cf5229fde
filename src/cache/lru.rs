//! Recency List Module
//!
//! Doubly linked recency ordering stored in a slab arena. Links are slot
//! indices rather than pointers; freed slots are recycled through a free
//! list so indices stay stable for the lifetime of an entry.

use super::entry::Entry;

// == Recency List ==
/// Arena-backed list where:
/// - head = most recently used
/// - tail = least recently used
#[derive(Debug)]
pub struct RecencyList<V> {
    slots: Vec<Option<Entry<V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<V> Default for RecencyList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RecencyList<V> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Creates an empty list with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    // == Push Front ==
    /// Stores `entry` in a slot and links it at the head.
    ///
    /// Returns the slot index, stable until the entry is removed.
    pub fn push_front(&mut self, mut entry: Entry<V>) -> usize {
        entry.prev = None;
        entry.next = self.head;

        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                idx
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        };

        match self.head {
            Some(old_head) => self.link_mut(old_head).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        self.len += 1;
        idx
    }

    // == Remove ==
    /// Unlinks the entry at `idx` and frees its slot.
    ///
    /// Returns None if the slot is vacant.
    pub fn remove(&mut self, idx: usize) -> Option<Entry<V>> {
        if self.slots.get(idx)?.is_none() {
            return None;
        }
        self.unlink(idx);
        let mut entry = self.slots[idx].take()?;
        entry.prev = None;
        entry.next = None;
        self.free.push(idx);
        self.len -= 1;
        Some(entry)
    }

    // == Move To Front ==
    /// Marks the entry at `idx` as most recently used.
    pub fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) || self.get(idx).is_none() {
            return;
        }
        self.unlink(idx);

        let old_head = self.head;
        {
            let entry = self.link_mut(idx);
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head {
            Some(h) => self.link_mut(h).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    // == Accessors ==
    pub fn get(&self, idx: usize) -> Option<&Entry<V>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Entry<V>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    /// Slot index of the most recently used entry.
    pub fn head(&self) -> Option<usize> {
        self.head
    }

    /// Slot index of the least recently used entry.
    pub fn tail(&self) -> Option<usize> {
        self.tail
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Walks the list from head (most recent) to tail.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    // == Internal Linking ==
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let entry = self.link_mut(idx);
            (entry.prev, entry.next)
        };

        match prev {
            Some(p) => self.link_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.link_mut(n).prev = prev,
            None => self.tail = prev,
        }
    }

    // Linked indices always refer to occupied slots.
    fn link_mut(&mut self, idx: usize) -> &mut Entry<V> {
        match self.slots[idx].as_mut() {
            Some(entry) => entry,
            None => unreachable!("recency link points at vacant slot {idx}"),
        }
    }
}

// == Iterator ==
/// Head-to-tail iterator over live entries.
pub struct Iter<'a, V> {
    list: &'a RecencyList<V>,
    cursor: Option<usize>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a Entry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.list.get(self.cursor?)?;
        self.cursor = entry.next;
        Some(entry)
    }
}
