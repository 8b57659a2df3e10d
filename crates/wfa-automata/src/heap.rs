// Binary heap with removal by key, ordered by a caller-supplied comparator.

use std::cmp::Ordering;
use std::hash::Hash;

use hashbrown::HashMap;

struct Entry<S, K> {
    state: S,
    key: K,
    seq: u64,
}

/// Min-heap of states keyed by `K`.
///
/// Each state is present at most once. Entries with equal keys pop in
/// insertion order. The comparator is passed to every mutating call so the
/// heap itself carries no reference to the semiring.
pub(crate) struct IndexedHeap<S, K> {
    entries: Vec<Entry<S, K>>,
    positions: HashMap<S, usize>,
    next_seq: u64,
}

impl<S: Clone + Eq + Hash, K> IndexedHeap<S, K> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
            next_seq: 0,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }

    /// Insert `state`, replacing any entry it already has.
    pub(crate) fn push(&mut self, state: S, key: K, cmp: impl Fn(&K, &K) -> Ordering) {
        self.remove(&state, &cmp);
        let seq = self.next_seq;
        self.next_seq += 1;
        let index = self.entries.len();
        self.positions.insert(state.clone(), index);
        self.entries.push(Entry { state, key, seq });
        self.sift_up(index, &cmp);
    }

    pub(crate) fn remove(&mut self, state: &S, cmp: impl Fn(&K, &K) -> Ordering) -> Option<K> {
        let index = self.positions.remove(state)?;
        let last = self.entries.len() - 1;
        self.swap(index, last);
        let entry = self.entries.pop()?;
        if index < self.entries.len() {
            self.positions.insert(self.entries[index].state.clone(), index);
            self.sift_down(index, &cmp);
            self.sift_up(index, &cmp);
        }
        Some(entry.key)
    }

    pub(crate) fn pop(&mut self, cmp: impl Fn(&K, &K) -> Ordering) -> Option<(S, K)> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.swap(0, last);
        let entry = self.entries.pop()?;
        self.positions.remove(&entry.state);
        if !self.entries.is_empty() {
            self.positions.insert(self.entries[0].state.clone(), 0);
            self.sift_down(0, &cmp);
        }
        Some((entry.state, entry.key))
    }

    fn less(&self, i: usize, j: usize, cmp: &impl Fn(&K, &K) -> Ordering) -> bool {
        let (a, b) = (&self.entries[i], &self.entries[j]);
        cmp(&a.key, &b.key).then(a.seq.cmp(&b.seq)) == Ordering::Less
    }

    fn swap(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.entries.swap(i, j);
        for k in [i, j] {
            if let Some(position) = self.positions.get_mut(&self.entries[k].state) {
                *position = k;
            }
        }
    }

    fn sift_up(&mut self, mut index: usize, cmp: &impl Fn(&K, &K) -> Ordering) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.less(index, parent, cmp) {
                break;
            }
            self.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize, cmp: &impl Fn(&K, &K) -> Ordering) {
        let len = self.entries.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut best = index;
            if left < len && self.less(left, best, cmp) {
                best = left;
            }
            if right < len && self.less(right, best, cmp) {
                best = right;
            }
            if best == index {
                break;
            }
            self.swap(index, best);
            index = best;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asc(a: &u32, b: &u32) -> Ordering {
        a.cmp(b)
    }

    #[test]
    fn pops_in_key_order() {
        let mut heap = IndexedHeap::new();
        for (state, key) in [('a', 5), ('b', 1), ('c', 3), ('d', 4), ('e', 2)] {
            heap.push(state, key, asc);
        }
        let order: Vec<char> = std::iter::from_fn(|| heap.pop(asc).map(|(s, _)| s)).collect();
        assert_eq!(order, vec!['b', 'e', 'c', 'd', 'a']);
    }

    #[test]
    fn ties_pop_in_insertion_order() {
        let mut heap = IndexedHeap::new();
        for state in ['x', 'y', 'z'] {
            heap.push(state, 0, asc);
        }
        let order: Vec<char> = std::iter::from_fn(|| heap.pop(asc).map(|(s, _)| s)).collect();
        assert_eq!(order, vec!['x', 'y', 'z']);
    }

    #[test]
    fn reinsert_replaces_key() {
        let mut heap = IndexedHeap::new();
        heap.push('a', 1, asc);
        heap.push('b', 2, asc);
        heap.push('a', 3, asc);
        assert_eq!(heap.len(), 2);
        assert_eq!(heap.pop(asc), Some(('b', 2)));
        assert_eq!(heap.pop(asc), Some(('a', 3)));
        assert!(heap.is_empty());
    }

    #[test]
    fn remove_from_middle() {
        let mut heap = IndexedHeap::new();
        for (state, key) in [(1u8, 10), (2, 20), (3, 30), (4, 40), (5, 50)] {
            heap.push(state, key, asc);
        }
        assert_eq!(heap.remove(&2, asc), Some(20));
        assert_eq!(heap.remove(&9, asc), None);
        let order: Vec<u8> = std::iter::from_fn(|| heap.pop(asc).map(|(s, _)| s)).collect();
        assert_eq!(order, vec![1, 3, 4, 5]);
    }
}
