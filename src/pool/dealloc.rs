/*!
 * Deallocation
 * Pointer recovery, misuse detection, and coalescing
 */

use std::ptr::NonNull;

use log::{debug, error};

use super::block::HEADER_SIZE;
use super::free_list::bucket_index;
use super::types::{PoolError, PoolResult};
use super::Pool;
use crate::core::types::{Offset, NIL};

impl Pool {
    /// Return a payload pointer to the pool.
    ///
    /// The block header is recovered at a fixed negative offset from the
    /// pointer and must validate before anything is touched; a corrupt
    /// header or an already-free block is reported without mutating the
    /// pool. The freed block is merged with physically adjacent free
    /// neighbors, forward then backward, and the result is re-bucketed.
    pub fn deallocate(&mut self, ptr: NonNull<u8>) -> PoolResult<()> {
        let offset = self.payload_to_block(ptr)?;

        if !self.header(offset).is_valid() {
            error!(
                "pool '{}': invalid block header at {:#x} on free",
                self.name(),
                offset
            );
            return Err(PoolError::Corruption {
                offset,
                reason: "invalid header on free",
            });
        }

        if self.header(offset).is_free() {
            error!(
                "pool '{}': double free detected at {:#x}",
                self.name(),
                offset
            );
            return Err(PoolError::DoubleFree { offset });
        }

        let size = self.header(offset).size;
        self.used_size -= size;
        self.deallocation_count += 1;
        self.header_mut(offset).set_free(true);

        debug!(
            "pool '{}': freed {} bytes at {:#x}",
            self.name(),
            size,
            offset
        );

        let merged = self.coalesce(offset);
        self.insert_free_block(merged);

        Ok(())
    }

    /// Merge the free block at `offset` with adjacent free blocks.
    ///
    /// Forward first: while the chain successor is valid, free, and starts
    /// exactly where this block ends, absorb it. Then the mirror image
    /// against predecessors, continuing from the enlarged front block. The
    /// block being merged is in no bucket; neighbors are unlinked from
    /// theirs before absorption. An invalid neighbor ends that direction.
    fn coalesce(&mut self, mut offset: Offset) -> Offset {
        loop {
            let (size, next) = {
                let header = self.header(offset);
                (header.size, header.next_phys)
            };

            if next == NIL {
                break;
            }

            let (next_valid, next_free, next_size, next_next) = {
                let header = self.header(next);
                (
                    header.is_valid(),
                    header.is_free(),
                    header.size,
                    header.next_phys,
                )
            };

            if !next_valid || !next_free || offset + HEADER_SIZE + size != next {
                break;
            }

            self.remove_free_block(next, bucket_index(next_size));

            {
                let header = self.header_mut(offset);
                header.size = size + HEADER_SIZE + next_size;
                header.next_phys = next_next;
            }

            if next_next != NIL {
                self.header_mut(next_next).prev_phys = offset;
            }

            self.block_count -= 1;

            debug!(
                "pool '{}': coalesced forward at {:#x}: new size {}",
                self.name(),
                offset,
                self.header(offset).size
            );
        }

        loop {
            let (size, prev, next) = {
                let header = self.header(offset);
                (header.size, header.prev_phys, header.next_phys)
            };

            if prev == NIL {
                break;
            }

            let (prev_valid, prev_free, prev_size) = {
                let header = self.header(prev);
                (header.is_valid(), header.is_free(), header.size)
            };

            if !prev_valid || !prev_free || prev + HEADER_SIZE + prev_size != offset {
                break;
            }

            self.remove_free_block(prev, bucket_index(prev_size));

            {
                let header = self.header_mut(prev);
                header.size = prev_size + HEADER_SIZE + size;
                header.next_phys = next;
            }

            if next != NIL {
                self.header_mut(next).prev_phys = prev;
            }

            self.block_count -= 1;
            offset = prev;

            debug!(
                "pool '{}': coalesced backward into {:#x}: new size {}",
                self.name(),
                offset,
                self.header(offset).size
            );
        }

        offset
    }
}
