//! Local-displacement allocation within one function body.
//!
//! Locals receive increasing non-negative offsets from the frame base;
//! the allocator also tracks the high-water mark so the driver can record
//! `max-displacement` per function for the code generator's stack-frame
//! sizing, mirroring the reference compiler's `anstdispl` bookkeeping.

use loomc_tree::Displacement;

#[derive(Debug, Default)]
pub struct FrameAllocator {
    next: Displacement,
    max: Displacement,
}

impl FrameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate `words` consecutive slots, returning the first one's
    /// displacement.
    pub fn alloc(&mut self, words: u32) -> Displacement {
        let displacement = self.next;
        self.next += words as Displacement;
        self.max = self.max.max(self.next);
        displacement
    }

    /// Roll the allocator back to a saved cursor (e.g. leaving a block
    /// scope frees the locals it declared, but the function-wide high-water
    /// mark is unaffected).
    pub fn cursor(&self) -> Displacement {
        self.next
    }

    pub fn rewind(&mut self, cursor: Displacement) {
        self.next = cursor;
    }

    pub fn max_displacement(&self) -> Displacement {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_increase_and_track_the_high_water_mark() {
        let mut frame = FrameAllocator::new();
        assert_eq!(frame.alloc(1), 0);
        assert_eq!(frame.alloc(2), 1);
        assert_eq!(frame.max_displacement(), 3);
    }

    #[test]
    fn rewind_frees_a_blocks_locals_without_lowering_the_high_water_mark() {
        let mut frame = FrameAllocator::new();
        let cursor = frame.cursor();
        frame.alloc(4);
        frame.rewind(cursor);
        assert_eq!(frame.cursor(), 0);
        assert_eq!(frame.max_displacement(), 4);
    }
}
