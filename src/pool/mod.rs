/*!
 * Memory Pool
 *
 * Fixed-arena block allocator with segmented free lists.
 *
 * ## Layout
 *
 * One anonymous mapping is carved into a doubly-linked chain of blocks, each
 * prefixed by a 64-byte header carrying its size, free flag, chain links,
 * bucket links, and two corruption signatures. Blocks are addressed by byte
 * offset into the arena; no header stores a raw pointer.
 *
 * ## Allocation strategy
 *
 * Free blocks live in 32 size-class buckets. Allocation scans buckets from
 * the requested size class upward keeping the smallest adequate block seen
 * (an exact fit short-circuits), splits off any usefully large remainder,
 * and hands out the payload after the header. Deallocation merges the block
 * with physically adjacent free neighbors before re-bucketing it.
 *
 * ## Lifecycle
 *
 * `init` is the only way to obtain a pool; every operation borrows it, and
 * `destroy` consumes it, so use-after-destroy is unrepresentable. The core
 * is single-threaded: wrap the pool in a mutex for concurrent callers.
 */

mod alloc;
mod arena;
mod block;
mod dealloc;
mod free_list;
mod stats;
mod traits;
mod types;
mod validate;

pub use traits::{BlockAllocator, PoolInspect};
pub use types::{BlockInfo, PoolError, PoolResult, PoolStats};

use std::ptr::{self, NonNull};

use log::{info, warn};

use crate::core::limits::{DEFAULT_ALIGNMENT, MAX_ALIGNMENT};
use crate::core::types::{Offset, Size, NIL};
use arena::Arena;
use block::{align_up, BlockHeader, HEADER_SIZE};
use free_list::FreeListDirectory;

/// A fixed-size memory pool.
///
/// Owns its arena and every block header inside it. Payload pointers handed
/// out by [`allocate`](Pool::allocate) are non-owning views into the arena.
pub struct Pool {
    arena: Arena,
    alignment: Size,
    name: String,
    directory: FreeListDirectory,
    used_size: Size,
    peak_usage: Size,
    allocation_count: usize,
    deallocation_count: usize,
    block_count: usize,
}

impl Pool {
    /// Create a pool backed by a fresh anonymous mapping.
    ///
    /// `total_size` is rounded up to the page size. `alignment` governs
    /// per-payload rounding; 0 selects the platform word size, and anything
    /// else must be a power of two between 8 and 64. The whole usable arena
    /// starts out as a single free block.
    pub fn init(total_size: Size, alignment: Size, name: &str) -> PoolResult<Self> {
        if total_size == 0 {
            return Err(PoolError::InvalidArgument("pool size must be nonzero"));
        }

        let alignment = if alignment == 0 {
            DEFAULT_ALIGNMENT
        } else {
            alignment
        };

        if !alignment.is_power_of_two()
            || alignment < DEFAULT_ALIGNMENT
            || alignment > MAX_ALIGNMENT
        {
            return Err(PoolError::InvalidArgument(
                "alignment must be a power of two between 8 and 64",
            ));
        }

        let total_size = align_up(total_size, arena::page_size());
        let arena = Arena::map(total_size)?;
        let usable = total_size - HEADER_SIZE;

        let name = if name.is_empty() { "unnamed" } else { name };

        let mut pool = Self {
            arena,
            alignment,
            name: name.to_string(),
            directory: FreeListDirectory::new(),
            used_size: 0,
            peak_usage: 0,
            allocation_count: 0,
            deallocation_count: 0,
            block_count: 1,
        };

        unsafe {
            pool.write_header(0, BlockHeader::new_free(usable, NIL, NIL));
        }
        pool.insert_free_block(0);

        info!(
            "memory pool '{}' initialized: {} bytes ({}-byte alignment)",
            pool.name, total_size, alignment
        );

        Ok(pool)
    }

    /// Tear the pool down, reporting outstanding allocations.
    ///
    /// The leak diagnostic is informational; the arena is unmapped either
    /// way. Dropping the pool releases the arena too, without the report.
    pub fn destroy(self) {
        info!("destroying pool '{}'", self.name);

        if self.allocation_count != self.deallocation_count {
            warn!(
                "pool '{}': leak detected - {} allocations, {} deallocations",
                self.name, self.allocation_count, self.deallocation_count
            );
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arena capacity in bytes, including header overhead.
    pub fn total_size(&self) -> Size {
        self.arena.len()
    }

    pub fn alignment(&self) -> Size {
        self.alignment
    }

    /// Bytes currently handed out to callers.
    pub fn used_size(&self) -> Size {
        self.used_size
    }

    /// Borrow the header at `offset`.
    ///
    /// Offsets only ever come from the chain head, validated links, or
    /// pointer recovery, all of which are bounds-checked before use.
    pub(crate) fn header(&self, offset: Offset) -> &BlockHeader {
        debug_assert!(offset + HEADER_SIZE <= self.arena.len());
        unsafe { &*(self.arena.base_ptr().add(offset) as *const BlockHeader) }
    }

    pub(crate) fn header_mut(&mut self, offset: Offset) -> &mut BlockHeader {
        debug_assert!(offset + HEADER_SIZE <= self.arena.len());
        unsafe { &mut *(self.arena.base_ptr().add(offset) as *mut BlockHeader) }
    }

    /// Write a whole header into arena memory that may not hold one yet.
    ///
    /// # Safety
    ///
    /// `offset + HEADER_SIZE` must lie within the arena, and the bytes being
    /// overwritten must not belong to a live payload.
    pub(crate) unsafe fn write_header(&mut self, offset: Offset, header: BlockHeader) {
        debug_assert!(offset + HEADER_SIZE <= self.arena.len());
        ptr::write(self.arena.base_ptr().add(offset) as *mut BlockHeader, header);
    }

    /// Payload pointer for the block at `offset`.
    pub(crate) fn payload_ptr(&self, offset: Offset) -> NonNull<u8> {
        debug_assert!(offset + HEADER_SIZE <= self.arena.len());
        unsafe { NonNull::new_unchecked(self.arena.base_ptr().add(offset + HEADER_SIZE)) }
    }

    /// Recover the header offset behind a payload pointer.
    ///
    /// Rejects pointers outside the arena's payload range before any header
    /// byte is read.
    pub(crate) fn payload_to_block(&self, ptr: NonNull<u8>) -> PoolResult<Offset> {
        let base = self.arena.base_ptr() as usize;
        let addr = ptr.as_ptr() as usize;

        if addr < base + HEADER_SIZE || addr >= base + self.arena.len() {
            return Err(PoolError::InvalidArgument("pointer outside pool arena"));
        }

        Ok(addr - base - HEADER_SIZE)
    }
}
