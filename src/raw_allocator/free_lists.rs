//! The thirteen segregated free lists and the bounded best-fit search over
//! them.

use super::block::Block;
use super::list_node;
use super::sandbox::Offset;
use super::size_class::{class_of, is_exact_fit, NUM_CLASSES};

/// How many candidates a best-fit probe examines, starting from the first
/// block in a list that fits, before settling on the smallest one seen.
/// Exposed so it can be tuned without touching the search code.
pub const PROBE_DEPTH: usize = 5;

/// Head offsets for each of the 13 lists. `ABSENT` (0) means empty.
pub struct FreeLists {
    heads: [Offset; NUM_CLASSES],
}

impl FreeLists {
    pub const fn new() -> Self {
        Self {
            heads: [list_node::ABSENT; NUM_CLASSES],
        }
    }

    pub fn head(&self, class: usize) -> Offset {
        self.heads[class]
    }

    /// Insert a free block into the list matching its own size.
    pub unsafe fn insert(&mut self, base: *mut u8, block_off: Offset) {
        let block = list_node::block_at(base, block_off);
        let class = class_of(block.size());
        list_node::insert(base, &mut self.heads[class], block_off);
    }

    /// Remove a free block from a specific class's list. The caller must
    /// know which class the block is currently filed under.
    pub unsafe fn remove(&mut self, base: *mut u8, class: usize, block_off: Offset) {
        list_node::delete(base, &mut self.heads[class], block_off);
    }

    /// Pop the head of an exact-fit class. Every member fits by
    /// construction, so no size check is needed.
    pub unsafe fn pop_exact(&mut self, base: *mut u8, class: usize) -> Option<Offset> {
        debug_assert!(is_exact_fit(class));
        let head = self.heads[class];
        if head == list_node::ABSENT {
            return None;
        }
        list_node::delete(base, &mut self.heads[class], head);
        Some(head)
    }

    /// Bounded best-fit probe over a range-fit or variable class's list.
    ///
    /// Walks the list from its head; once a block that fits `min_size` is
    /// found, examines it plus up to `probe_depth - 1` further fitting
    /// successors and keeps the smallest. Removes and returns the winner.
    pub unsafe fn take_best_fit(
        &mut self,
        base: *mut u8,
        class: usize,
        min_size: usize,
        probe_depth: usize,
    ) -> Option<Offset> {
        let head = self.heads[class];
        if head == list_node::ABSENT {
            return None;
        }
        let mut cursor = head;
        let mut best: Option<(Offset, usize)> = None;
        let mut probed = 0usize;
        loop {
            let block = list_node::block_at(base, cursor);
            let size = block.size();
            if size >= min_size {
                let is_better = match best {
                    None => true,
                    Some((_, best_size)) => size < best_size,
                };
                if is_better {
                    best = Some((cursor, size));
                }
                probed += 1;
                if probed >= probe_depth {
                    break;
                }
            }
            let next = list_node::read_next(block);
            if next == head {
                break;
            }
            cursor = next;
        }
        let (won_off, won_size) = best?;
        let won_class = class_of(won_size);
        list_node::delete(base, &mut self.heads[won_class], won_off);
        Some(won_off)
    }
}
