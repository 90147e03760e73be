/*!
 * Integrity Validation
 * Bounded whole-chain structural audit
 */

use log::error;

use super::block::HEADER_SIZE;
use super::types::{PoolError, PoolResult};
use super::Pool;
use crate::core::limits::MAX_VALIDATE_STEPS;
use crate::core::types::NIL;

impl Pool {
    /// Walk the whole block chain and check it against the pool's counters.
    ///
    /// Every header must carry intact signatures and a nonzero size,
    /// consecutive blocks must be back-linked and physically adjacent, the
    /// chain must cover the arena exactly, and the summed size of used
    /// blocks must reconcile with `used_size`. The walk is capped at
    /// [`MAX_VALIDATE_STEPS`] so cyclic corruption is reported instead of
    /// looping forever. Any failure terminates only this walk.
    pub fn validate(&self) -> PoolResult<()> {
        let mut offset = 0;
        let mut previous = NIL;
        let mut computed_used = 0;
        let mut steps = 0;

        loop {
            steps += 1;
            if steps > MAX_VALIDATE_STEPS {
                error!(
                    "pool '{}': validation walk exceeded {} steps at {:#x}",
                    self.name(),
                    MAX_VALIDATE_STEPS,
                    offset
                );
                return Err(PoolError::Corruption {
                    offset,
                    reason: "walk exceeded step bound",
                });
            }

            let header = self.header(offset);
            if !header.is_valid() {
                error!(
                    "pool '{}': invalid block header at {:#x}",
                    self.name(),
                    offset
                );
                return Err(PoolError::Corruption {
                    offset,
                    reason: "signature mismatch or zero size",
                });
            }

            if header.prev_phys != previous {
                return Err(PoolError::Corruption {
                    offset,
                    reason: "broken back-link",
                });
            }

            if !header.is_free() {
                computed_used += header.size;
            }

            let end = offset + HEADER_SIZE + header.size;
            if end > self.total_size() {
                return Err(PoolError::Corruption {
                    offset,
                    reason: "block extends past arena end",
                });
            }

            let next = header.next_phys;
            if next == NIL {
                if end != self.total_size() {
                    return Err(PoolError::Corruption {
                        offset,
                        reason: "chain does not cover arena",
                    });
                }
                break;
            }

            if next != end {
                return Err(PoolError::Corruption {
                    offset,
                    reason: "gap or overlap in chain",
                });
            }

            previous = offset;
            offset = next;
        }

        if computed_used != self.used_size() {
            error!(
                "pool '{}': used size mismatch: tracked {}, chain shows {}",
                self.name(),
                self.used_size(),
                computed_used
            );
            return Err(PoolError::Corruption {
                offset: 0,
                reason: "used size mismatch between counters and chain",
            });
        }

        Ok(())
    }
}
