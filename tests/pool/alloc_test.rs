/*!
 * Allocation Tests
 * Creation, alignment, best-fit, splitting, coalescing, and OOM behavior
 */

use mempool::{Pool, PoolError};
use pretty_assertions::assert_eq;

const MIB: usize = 1024 * 1024;

/// Capacity of the single free block a fresh pool starts with.
fn usable(pool: &Pool) -> usize {
    pool.stats().largest_free_block
}

#[test]
fn test_init_rejects_zero_size() {
    assert_eq!(
        Pool::init(0, 8, "p").err(),
        Some(PoolError::InvalidArgument("pool size must be nonzero"))
    );
}

#[test]
fn test_init_rejects_bad_alignment() {
    assert!(matches!(
        Pool::init(MIB, 3, "p"),
        Err(PoolError::InvalidArgument(_))
    ));
    assert!(matches!(
        Pool::init(MIB, 128, "p"),
        Err(PoolError::InvalidArgument(_))
    ));
    assert!(matches!(
        Pool::init(MIB, 4, "p"),
        Err(PoolError::InvalidArgument(_))
    ));
}

#[test]
fn test_init_defaults() {
    let pool = Pool::init(MIB, 0, "").unwrap();
    assert_eq!(pool.alignment(), 8);
    assert_eq!(pool.name(), "unnamed");
    assert_eq!(pool.used_size(), 0);
}

#[test]
fn test_init_rounds_to_page_size() {
    let pool = Pool::init(1, 8, "tiny").unwrap();
    assert!(pool.total_size() >= 4096);
    assert_eq!(pool.total_size() % 4096, 0);
}

#[test]
fn test_fresh_pool_is_one_free_block() {
    let pool = Pool::init(MIB, 8, "p").unwrap();
    let stats = pool.stats();
    assert_eq!(stats.block_count, 1);
    assert_eq!(stats.free_blocks, 1);
    assert_eq!(stats.used_size, 0);
    assert!(stats.largest_free_block < stats.total_size);
    pool.validate().unwrap();
}

#[test]
fn test_basic_allocation() {
    let mut pool = Pool::init(MIB, 8, "p").unwrap();
    let ptr = pool.allocate(16).unwrap();
    assert!(!ptr.as_ptr().is_null());
    assert_eq!(pool.used_size(), 16);

    let stats = pool.stats();
    assert_eq!(stats.allocation_count, 1);
    assert_eq!(stats.peak_usage, 16);
    pool.validate().unwrap();
}

#[test]
fn test_zero_size_allocation_rejected() {
    let mut pool = Pool::init(MIB, 8, "p").unwrap();
    assert!(matches!(
        pool.allocate(0),
        Err(PoolError::InvalidArgument(_))
    ));
    assert_eq!(pool.stats().allocation_count, 0);
}

#[test]
fn test_multiple_allocations_are_distinct() {
    let mut pool = Pool::init(MIB, 8, "p").unwrap();
    let a = pool.allocate(1024).unwrap();
    let b = pool.allocate(2048).unwrap();
    let c = pool.allocate(4096).unwrap();

    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_ne!(a, c);
    assert_eq!(pool.used_size(), 1024 + 2048 + 4096);
    pool.validate().unwrap();
}

#[test]
fn test_payload_alignment() {
    for alignment in [8, 16, 32, 64] {
        let mut pool = Pool::init(MIB, alignment, "p").unwrap();
        for size in [1, 7, 13, 100, 999] {
            let ptr = pool.allocate(size).unwrap();
            assert_eq!(
                ptr.as_ptr() as usize % alignment,
                0,
                "size {} alignment {}",
                size,
                alignment
            );
        }
        pool.validate().unwrap();
    }
}

#[test]
fn test_payloads_are_writable() {
    let mut pool = Pool::init(MIB, 8, "p").unwrap();
    let a = pool.allocate(256).unwrap();
    let b = pool.allocate(256).unwrap();

    unsafe {
        a.as_ptr().write_bytes(0xAA, 256);
        b.as_ptr().write_bytes(0xBB, 256);
        assert!((0..256).all(|i| a.as_ptr().add(i).read() == 0xAA));
        assert!((0..256).all(|i| b.as_ptr().add(i).read() == 0xBB));
    }
    pool.validate().unwrap();
}

#[test]
fn test_split_leaves_free_remainder() {
    let mut pool = Pool::init(MIB, 8, "p").unwrap();
    pool.allocate(64).unwrap();

    let layout = pool.blocks().unwrap();
    assert_eq!(layout.len(), 2);
    assert!(!layout[0].free);
    assert_eq!(layout[0].size, 64);
    assert!(layout[1].free);
    pool.validate().unwrap();
}

#[test]
fn test_no_split_when_remainder_too_small() {
    let mut pool = Pool::init(MIB, 8, "p").unwrap();
    let a = pool.allocate(104).unwrap();
    pool.allocate(8).unwrap();
    pool.deallocate(a).unwrap();

    // The freed 104-byte block cannot shed a remainder for a 96-byte
    // request (8 spare bytes < header + minimum payload), so the caller
    // gets the whole block.
    let block_count = pool.stats().block_count;
    pool.allocate(96).unwrap();
    assert_eq!(pool.stats().block_count, block_count);
    assert_eq!(pool.used_size(), 104 + 8);
    pool.validate().unwrap();
}

#[test]
fn test_best_fit_prefers_smallest_and_exact() {
    let mut pool = Pool::init(MIB, 8, "p").unwrap();
    let a = pool.allocate(104).unwrap();
    pool.allocate(8).unwrap();
    let b = pool.allocate(120).unwrap();
    pool.allocate(8).unwrap();

    pool.deallocate(a).unwrap();
    pool.deallocate(b).unwrap();

    // Both freed blocks share a bucket; the 104-byte one is the smaller
    // qualifying candidate and an exact fit for a 104-byte request.
    let reused = pool.allocate(104).unwrap();
    assert_eq!(reused, a);
    pool.validate().unwrap();
}

#[test]
fn test_free_restores_used_size() {
    let mut pool = Pool::init(MIB, 8, "p").unwrap();
    let a = pool.allocate(16).unwrap();
    let b = pool.allocate(32).unwrap();

    pool.deallocate(a).unwrap();
    pool.validate().unwrap();
    assert_eq!(pool.used_size(), 32);

    pool.deallocate(b).unwrap();
    pool.validate().unwrap();
    assert_eq!(pool.used_size(), 0);
}

#[test]
fn test_whole_arena_fits_exactly_once() {
    let mut pool = Pool::init(MIB, 8, "p").unwrap();
    let capacity = usable(&pool);

    let ptr = pool.allocate(capacity).unwrap();
    assert_eq!(pool.used_size(), capacity);

    assert!(matches!(
        pool.allocate(1),
        Err(PoolError::OutOfMemory { requested: 1, .. })
    ));

    pool.deallocate(ptr).unwrap();
    assert_eq!(pool.used_size(), 0);

    // The capacity is reusable after the free.
    pool.allocate(capacity).unwrap();
    pool.validate().unwrap();
}

#[test]
fn test_oom_for_oversized_request() {
    let mut pool = Pool::init(MIB, 8, "p").unwrap();
    assert!(matches!(
        pool.allocate(pool.total_size()),
        Err(PoolError::OutOfMemory { .. })
    ));

    // The early rejection touched nothing.
    pool.validate().unwrap();
    pool.allocate(16).unwrap();
    pool.validate().unwrap();
}

#[test]
fn test_frees_coalesce_into_whole_arena() {
    let mut pool = Pool::init(MIB, 8, "p").unwrap();
    let capacity = usable(&pool);

    let a = pool.allocate(100).unwrap();
    let b = pool.allocate(200).unwrap();

    pool.deallocate(b).unwrap();
    pool.deallocate(a).unwrap();

    let layout = pool.blocks().unwrap();
    assert_eq!(layout.len(), 1);
    assert!(layout[0].free);
    assert_eq!(layout[0].size, capacity);

    let stats = pool.stats();
    assert_eq!(stats.free_blocks, 1);
    assert_eq!(stats.largest_free_block, capacity);
    pool.validate().unwrap();
}

#[test]
fn test_coalesce_across_interior_free() {
    let mut pool = Pool::init(MIB, 8, "p").unwrap();
    let a = pool.allocate(64).unwrap();
    let b = pool.allocate(64).unwrap();
    let c = pool.allocate(64).unwrap();
    pool.allocate(64).unwrap();

    // Free the middle first, then its neighbors; each free must merge with
    // the hole instead of leaving adjacent free blocks behind.
    pool.deallocate(b).unwrap();
    pool.deallocate(a).unwrap();
    pool.deallocate(c).unwrap();

    let layout = pool.blocks().unwrap();
    for pair in layout.windows(2) {
        assert!(
            !(pair[0].free && pair[1].free),
            "adjacent free blocks at {:#x} and {:#x}",
            pair[0].offset,
            pair[1].offset
        );
    }
    pool.validate().unwrap();
}

#[test]
fn test_counters_track_operations() {
    let mut pool = Pool::init(MIB, 8, "p").unwrap();
    let a = pool.allocate(16).unwrap();
    let b = pool.allocate(16).unwrap();
    pool.allocate(16).unwrap();
    pool.deallocate(a).unwrap();
    pool.deallocate(b).unwrap();

    let stats = pool.stats();
    assert_eq!(stats.allocation_count, 3);
    assert_eq!(stats.deallocation_count, 2);
    assert_eq!(stats.outstanding(), 1);
    assert_eq!(stats.used_size, 16);
    assert_eq!(stats.peak_usage, 48);
}

#[test]
fn test_peak_usage_survives_frees() {
    let mut pool = Pool::init(MIB, 8, "p").unwrap();
    let a = pool.allocate(4096).unwrap();
    pool.deallocate(a).unwrap();
    pool.allocate(16).unwrap();

    let stats = pool.stats();
    assert_eq!(stats.used_size, 16);
    assert_eq!(stats.peak_usage, 4096);
}
