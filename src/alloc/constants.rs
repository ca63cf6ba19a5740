//! Default sizes and alignment helpers.

/// Blocks threaded onto the free list each time a pool grows.
pub const DEFAULT_BLOCKS_PER_CHUNK: usize = 1000;

/// Default arena and stack buffer size (1 KB).
pub const DEFAULT_ARENA_CAPACITY: usize = 1024;

/// Alignment of every arena buffer; matches `max_align_t` on common targets.
pub const BUFFER_ALIGN: usize = 16;

/// Rounds `value` up to the next multiple of `align`.
///
/// `align` must be a power of two.
#[inline]
pub const fn align_up(value: usize, align: usize) -> usize {
    (value + (align - 1)) & !(align - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 8), 0);
        assert_eq!(align_up(1, 8), 8);
        assert_eq!(align_up(8, 8), 8);
        assert_eq!(align_up(9, 16), 16);
        assert_eq!(align_up(13, 1), 13);
    }
}
