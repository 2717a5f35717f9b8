use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::trie::Trie;

/// One entry in the frequency min-heap: a weight and the (sub-)trie it
/// carries. `std::collections::BinaryHeap` is a max-heap, so `Ord` is
/// implemented in reverse of `count` to make `pop()` return the minimum.
///
/// Ties are broken by insertion order (`seq`), which the original C++
/// leaves unspecified; the canonical code assignment that follows is
/// insensitive to the tie-break, so any deterministic rule is fine.
struct Entry {
    count: u64,
    seq: u64,
    trie: Trie,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.seq == other.seq
    }
}
impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.count, other.seq).cmp(&(self.count, self.seq))
    }
}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A min-heap over `(count, trie)` pairs, as used to build a Huffman tree
/// from a frequency table: repeatedly merge the two lowest-count entries.
pub struct MinHeap {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl MinHeap {
    pub fn new() -> MinHeap {
        MinHeap {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn insert(&mut self, count: u64, trie: Trie) {
        self.heap.push(Entry {
            count,
            seq: self.next_seq,
            trie,
        });
        self.next_seq += 1;
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    fn extract_min(&mut self) -> Option<(u64, Trie)> {
        self.heap.pop().map(|entry| (entry.count, entry.trie))
    }

    /// Repeatedly merges the two minimum entries until a single trie
    /// remains, returning it. Panics if the heap started empty.
    pub fn merge_to_one(mut self) -> Trie {
        while self.len() > 1 {
            let (count_a, trie_a) = self.extract_min().expect("heap had at least two entries");
            let (count_b, trie_b) = self.extract_min().expect("heap had at least two entries");
            self.insert(count_a + count_b, Trie::merge(trie_a, trie_b));
        }
        self.extract_min()
            .expect("heap must have received at least one entry")
            .1
    }
}
