/*!
 * Allocation
 * Best-fit bucket search and block splitting
 */

use std::ptr::NonNull;

use log::{debug, error};

use super::block::{align_up, BlockHeader, HEADER_SIZE};
use super::free_list::bucket_index;
use super::types::{PoolError, PoolResult};
use super::Pool;
use crate::core::limits::{MAX_BUCKETS, MAX_VALIDATE_STEPS, MIN_BLOCK_SIZE};
use crate::core::types::{Offset, Size, NIL};

impl Pool {
    /// Allocate `size` bytes from the pool.
    ///
    /// The request is rounded up to the pool alignment, matched against the
    /// smallest adequate free block found scanning buckets from the request's
    /// size class upward, and split when the remainder can hold a block of
    /// its own. The returned pointer addresses the payload just past the
    /// block header; the caller may use exactly the granted capacity, which
    /// can exceed the request when no split occurred.
    pub fn allocate(&mut self, size: Size) -> PoolResult<NonNull<u8>> {
        if size == 0 {
            return Err(PoolError::InvalidArgument(
                "allocation size must be nonzero",
            ));
        }

        let remaining = self.total_size() - self.used_size();
        if size > remaining {
            error!(
                "pool '{}': allocation of {} bytes exceeds remaining capacity ({} available)",
                self.name(),
                size,
                remaining
            );
            return Err(PoolError::OutOfMemory {
                requested: size,
                available: remaining,
            });
        }

        let aligned = align_up(size, self.alignment());
        if aligned + HEADER_SIZE > remaining {
            error!(
                "pool '{}': allocation of {} bytes exceeds remaining capacity ({} available)",
                self.name(),
                size,
                remaining
            );
            return Err(PoolError::OutOfMemory {
                requested: size,
                available: remaining,
            });
        }

        let (offset, index) = match self.find_best_fit(aligned)? {
            Some(found) => found,
            None => {
                error!(
                    "pool '{}': no suitable free block for {} bytes",
                    self.name(),
                    size
                );
                return Err(PoolError::OutOfMemory {
                    requested: size,
                    available: remaining,
                });
            }
        };

        self.remove_free_block(offset, index);

        if let Some(remainder) = self.split_block(offset, aligned) {
            self.insert_free_block(remainder);
        }

        self.header_mut(offset).set_free(false);

        let granted = self.header(offset).size;
        self.used_size += granted;
        self.allocation_count += 1;
        if self.used_size > self.peak_usage {
            self.peak_usage = self.used_size;
        }

        debug!(
            "pool '{}': allocated {} bytes at {:#x} (requested {})",
            self.name(),
            granted,
            offset,
            size
        );

        Ok(self.payload_ptr(offset))
    }

    /// Scan buckets from the size class of `aligned` upward for the smallest
    /// free block that fits. An exact-size match ends the whole search on the
    /// spot; otherwise the best candidate so far is kept while larger buckets
    /// are still examined. Returns the winning block and its bucket.
    fn find_best_fit(&self, aligned: Size) -> PoolResult<Option<(Offset, usize)>> {
        let mut best: Option<(Offset, Size, usize)> = None;

        'directory: for index in bucket_index(aligned)..MAX_BUCKETS {
            let mut cursor = self.directory.bucket(index).head;
            let mut steps = 0;

            while cursor != NIL {
                steps += 1;
                if steps > MAX_VALIDATE_STEPS {
                    return Err(PoolError::Corruption {
                        offset: cursor,
                        reason: "free bucket walk exceeded step bound",
                    });
                }

                let header = self.header(cursor);
                if !header.is_valid() {
                    error!(
                        "pool '{}': corrupt header at {:#x} in free bucket {}",
                        self.name(),
                        cursor,
                        index
                    );
                    return Err(PoolError::Corruption {
                        offset: cursor,
                        reason: "invalid header in free bucket",
                    });
                }

                let candidate = header.size;
                let next = header.next_free;

                if header.is_free() && candidate >= aligned {
                    let improves = best.map_or(true, |(_, size, _)| candidate < size);
                    if improves {
                        best = Some((cursor, candidate, index));
                        if candidate == aligned {
                            break 'directory;
                        }
                    }
                }

                cursor = next;
            }
        }

        Ok(best.map(|(offset, _, index)| (offset, index)))
    }

    /// Carve `aligned` bytes off the front of the block at `offset`, turning
    /// the tail into a new free block. Skipped when the tail could not hold a
    /// header plus a minimum payload, in which case the caller keeps the
    /// whole block.
    fn split_block(&mut self, offset: Offset, aligned: Size) -> Option<Offset> {
        let (size, next_phys) = {
            let header = self.header(offset);
            (header.size, header.next_phys)
        };

        let remaining = size - aligned;
        if remaining < HEADER_SIZE + MIN_BLOCK_SIZE {
            return None;
        }

        let remainder = offset + HEADER_SIZE + aligned;
        let remainder_size = remaining - HEADER_SIZE;

        unsafe {
            self.write_header(
                remainder,
                BlockHeader::new_free(remainder_size, offset, next_phys),
            );
        }

        if next_phys != NIL {
            self.header_mut(next_phys).prev_phys = remainder;
        }

        {
            let header = self.header_mut(offset);
            header.size = aligned;
            header.next_phys = remainder;
        }

        self.block_count += 1;

        debug!(
            "pool '{}': split block at {:#x}: {} -> {} + {}",
            self.name(),
            offset,
            size,
            aligned,
            remainder_size
        );

        Some(remainder)
    }
}
