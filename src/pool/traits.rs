/*!
 * Pool Traits
 * Allocator and inspection seams
 */

use std::ptr::NonNull;

use super::types::{BlockInfo, PoolResult, PoolStats};
use super::Pool;
use crate::core::types::Size;

/// Block allocation interface
pub trait BlockAllocator {
    /// Allocate a payload of at least `size` bytes
    fn allocate(&mut self, size: Size) -> PoolResult<NonNull<u8>>;

    /// Return a payload to the pool
    fn deallocate(&mut self, ptr: NonNull<u8>) -> PoolResult<()>;
}

/// Pool inspection interface
pub trait PoolInspect {
    /// Snapshot usage counters
    fn stats(&self) -> PoolStats;

    /// Audit the block chain
    fn validate(&self) -> PoolResult<()>;

    /// Snapshot the physical layout
    fn blocks(&self) -> PoolResult<Vec<BlockInfo>>;
}

impl BlockAllocator for Pool {
    fn allocate(&mut self, size: Size) -> PoolResult<NonNull<u8>> {
        Pool::allocate(self, size)
    }

    fn deallocate(&mut self, ptr: NonNull<u8>) -> PoolResult<()> {
        Pool::deallocate(self, ptr)
    }
}

impl PoolInspect for Pool {
    fn stats(&self) -> PoolStats {
        Pool::stats(self)
    }

    fn validate(&self) -> PoolResult<()> {
        Pool::validate(self)
    }

    fn blocks(&self) -> PoolResult<Vec<BlockInfo>> {
        Pool::blocks(self)
    }
}
