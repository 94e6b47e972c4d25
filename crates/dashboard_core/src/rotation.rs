//! Pages through tables a fixed number at a time.

use serde::Serialize;
use tracing::debug;

pub const PAGE_SIZE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RotationState {
    /// Zero-based offset of the first visible table; a multiple of the page size.
    pub current_block_start: u32,
    pub max_table_index: u32,
    pub page_size: u32,
}

impl RotationState {
    pub fn visible_count(&self) -> u32 {
        visible_count(self.current_block_start, self.max_table_index, self.page_size)
    }

    /// Same state measured against another wrap bound: the page is kept
    /// unless it falls outside the new range, then it snaps to the start.
    pub fn with_bound(mut self, max_table_index: u32) -> Self {
        self.max_table_index = max_table_index;
        if self.current_block_start >= max_table_index {
            self.current_block_start = 0;
        }
        self
    }

    /// 1-based page number and page count, both 0 when there are no tables.
    pub fn page_position(&self) -> (u32, u32) {
        if self.max_table_index == 0 {
            return (0, 0);
        }
        (
            self.current_block_start / self.page_size + 1,
            self.max_table_index.div_ceil(self.page_size),
        )
    }

    /// One-based table indices on the current page.
    pub fn visible_tables(&self) -> Vec<u32> {
        let first = self.current_block_start + 1;
        (first..first + self.visible_count()).collect()
    }
}

pub fn visible_count(start: u32, max_table_index: u32, page_size: u32) -> u32 {
    page_size.min(max_table_index.saturating_sub(start))
}

#[derive(Debug, Clone)]
pub struct RotationScheduler {
    state: RotationState,
}

impl RotationScheduler {
    pub fn new(page_size: u32) -> Self {
        Self {
            state: RotationState {
                current_block_start: 0,
                max_table_index: 0,
                page_size: page_size.max(1),
            },
        }
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    /// Re-evaluates the wrap bound against a freshly derived table count.
    pub fn set_bound(&mut self, max_table_index: u32) -> bool {
        if max_table_index == self.state.max_table_index {
            return false;
        }
        let previous = self.state.current_block_start;
        self.state = self.state.with_bound(max_table_index);
        if previous != self.state.current_block_start {
            debug!(
                offset = previous,
                max_table_index, "rotation offset out of range; snapping to first page"
            );
        }
        true
    }

    /// Advances one page, wrapping to the start after the last one.
    pub fn advance(&mut self) -> RotationState {
        let next = self.state.current_block_start + self.state.page_size;
        self.state.current_block_start = if next >= self.state.max_table_index {
            0
        } else {
            next
        };
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_tables_cycle_through_three_pages() {
        let mut rotation = RotationScheduler::new(PAGE_SIZE);
        rotation.set_bound(10);
        let mut offsets = vec![rotation.state().current_block_start];
        for _ in 0..3 {
            offsets.push(rotation.advance().current_block_start);
        }
        assert_eq!(offsets, vec![0, 4, 8, 0]);
        assert_eq!(visible_count(8, 10, PAGE_SIZE), 2);
    }

    #[test]
    fn last_page_shows_remaining_tables() {
        let mut rotation = RotationScheduler::new(PAGE_SIZE);
        rotation.set_bound(10);
        rotation.advance();
        let state = rotation.advance();
        assert_eq!(state.visible_tables(), vec![9, 10]);
    }

    #[test]
    fn no_tables_means_nothing_visible() {
        let mut rotation = RotationScheduler::new(PAGE_SIZE);
        for _ in 0..5 {
            let state = rotation.advance();
            assert_eq!(state.current_block_start, 0);
            assert_eq!(state.visible_count(), 0);
            assert!(state.visible_tables().is_empty());
        }
    }

    #[test]
    fn single_page_never_moves() {
        let mut rotation = RotationScheduler::new(PAGE_SIZE);
        rotation.set_bound(4);
        assert_eq!(rotation.advance().current_block_start, 0);
        assert_eq!(rotation.state().visible_tables(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn growing_bound_keeps_current_page() {
        let mut rotation = RotationScheduler::new(PAGE_SIZE);
        rotation.set_bound(10);
        rotation.advance();
        assert!(rotation.set_bound(14));
        assert_eq!(rotation.state().current_block_start, 4);
        assert_eq!(rotation.advance().current_block_start, 8);
        assert_eq!(rotation.advance().current_block_start, 12);
    }

    #[test]
    fn shrinking_below_current_page_snaps_to_start() {
        let mut rotation = RotationScheduler::new(PAGE_SIZE);
        rotation.set_bound(10);
        rotation.advance();
        rotation.advance();
        assert_eq!(rotation.state().current_block_start, 8);

        rotation.set_bound(6);
        assert_eq!(rotation.state().current_block_start, 0);
        assert_eq!(rotation.state().visible_count(), 4);
    }

    #[test]
    fn shrinking_that_keeps_page_in_range_preserves_it() {
        let mut rotation = RotationScheduler::new(PAGE_SIZE);
        rotation.set_bound(10);
        rotation.advance();
        rotation.set_bound(6);
        assert_eq!(rotation.state().current_block_start, 4);
        assert_eq!(rotation.state().visible_count(), 2);
    }

    #[test]
    fn page_position_counts_partial_pages() {
        let mut rotation = RotationScheduler::new(PAGE_SIZE);
        assert_eq!(rotation.state().page_position(), (0, 0));
        rotation.set_bound(10);
        assert_eq!(rotation.state().page_position(), (1, 3));
        rotation.advance();
        rotation.advance();
        assert_eq!(rotation.state().page_position(), (3, 3));
    }

    #[test]
    fn unchanged_bound_is_a_no_op() {
        let mut rotation = RotationScheduler::new(PAGE_SIZE);
        assert!(rotation.set_bound(7));
        assert!(!rotation.set_bound(7));
    }
}
