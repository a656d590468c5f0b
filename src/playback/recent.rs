use std::collections::VecDeque;

pub const DEFAULT_RECENT_CAPACITY: usize = 10;

/// Most-recent-first list of catalog indices, deduplicated and capped.
#[derive(Debug, Clone)]
pub struct RecentlyPlayed {
    entries: VecDeque<usize>,
    capacity: usize,
}

impl Default for RecentlyPlayed {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_RECENT_CAPACITY)
    }
}

impl RecentlyPlayed {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Move `index` to the front, dropping the oldest entry past capacity.
    pub fn push(&mut self, index: usize) {
        self.entries.retain(|&i| i != index);
        self.entries.push_front(index);
        self.entries.truncate(self.capacity);
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.entries.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
