/*!
 * Statistics
 * Usage counters and layout snapshots
 */

use super::block::HEADER_SIZE;
use super::types::{BlockInfo, PoolError, PoolResult, PoolStats};
use super::Pool;
use crate::core::limits::{MAX_LAYOUT_BLOCKS, MAX_VALIDATE_STEPS};
use crate::core::types::NIL;

impl Pool {
    /// Snapshot the pool's usage counters.
    ///
    /// Free-block count and largest free block come from the bucket lists;
    /// the fragmentation ratio relates the current block count to how many
    /// blocks the arena could hold at most (one header per block).
    pub fn stats(&self) -> PoolStats {
        let mut free_blocks = 0;
        let mut largest_free_block = 0;

        for bucket in self.directory.buckets() {
            free_blocks += bucket.count;

            let mut cursor = bucket.head;
            let mut steps = 0;
            while cursor != NIL && steps < MAX_VALIDATE_STEPS {
                let header = self.header(cursor);
                if !header.is_valid() {
                    break;
                }
                if header.size > largest_free_block {
                    largest_free_block = header.size;
                }
                cursor = header.next_free;
                steps += 1;
            }
        }

        let total_size = self.total_size();
        let fragmentation_ratio = if total_size >= HEADER_SIZE {
            self.block_count * 100 / (total_size / HEADER_SIZE)
        } else {
            0
        };

        PoolStats {
            total_size,
            used_size: self.used_size,
            available: total_size - self.used_size,
            usage_percentage: self.used_size as f64 * 100.0 / total_size as f64,
            peak_usage: self.peak_usage,
            allocation_count: self.allocation_count,
            deallocation_count: self.deallocation_count,
            block_count: self.block_count,
            free_blocks,
            largest_free_block,
            fragmentation_ratio,
        }
    }

    /// Snapshot the physical block chain for layout reports.
    ///
    /// The walk validates each header and stops at [`MAX_LAYOUT_BLOCKS`];
    /// a corrupt header fails the snapshot rather than yielding garbage.
    pub fn blocks(&self) -> PoolResult<Vec<BlockInfo>> {
        let mut layout = Vec::new();
        let mut offset = 0;

        loop {
            let header = self.header(offset);
            if !header.is_valid() {
                return Err(PoolError::Corruption {
                    offset,
                    reason: "invalid header in layout walk",
                });
            }

            layout.push(BlockInfo {
                offset,
                size: header.size,
                free: header.is_free(),
            });

            if layout.len() >= MAX_LAYOUT_BLOCKS || header.next_phys == NIL {
                break;
            }
            offset = header.next_phys;
        }

        Ok(layout)
    }
}
