/*!
 * Pool Types
 * Errors, statistics snapshots, and layout records
 */

use crate::core::types::{Offset, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pool operation result
pub type PoolResult<T> = Result<T, PoolError>;

/// Pool errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("out of memory: requested {requested} bytes, {available} bytes available")]
    OutOfMemory { requested: Size, available: Size },

    #[error("corruption detected at block offset {offset:#x}: {reason}")]
    Corruption { offset: Offset, reason: &'static str },

    #[error("double free of block at offset {offset:#x}")]
    DoubleFree { offset: Offset },

    #[error("failed to map arena: {0}")]
    ArenaMap(#[from] nix::errno::Errno),
}

/// Pool statistics snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStats {
    pub total_size: Size,
    pub used_size: Size,
    pub available: Size,
    pub usage_percentage: f64,
    pub peak_usage: Size,
    pub allocation_count: usize,
    pub deallocation_count: usize,
    pub block_count: usize,
    pub free_blocks: usize,
    pub largest_free_block: Size,
    pub fragmentation_ratio: usize,
}

impl PoolStats {
    /// Allocations that have not been returned yet
    pub fn outstanding(&self) -> usize {
        self.allocation_count.saturating_sub(self.deallocation_count)
    }
}

/// One block in a layout snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub offset: Offset,
    pub size: Size,
    pub free: bool,
}
