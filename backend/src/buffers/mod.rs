// Fixed-capacity sample history for the analysis charts.
// Invariants: once full, every push evicts the oldest element; ordered
// reads always run oldest to newest.

use std::collections::VecDeque;

#[derive(Debug)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    cap: usize,
}

impl<T: Clone> RingBuffer<T> {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            items: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.items.len() == self.cap {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn to_vec_ordered(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}
