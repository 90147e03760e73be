/*!
 * Pool Limits and Constants
 *
 * Centralized location for the allocator's limits, thresholds, and magic
 * numbers. Values that exist for a reason carry that reason next to them.
 */

/// Default pool capacity (1MB)
/// Used by the CLI when no `--size` flag is given
pub const DEFAULT_POOL_SIZE: usize = 1024 * 1024;

/// Default payload alignment (8 bytes, the 64-bit word size)
/// Applied when a pool is created with alignment 0
pub const DEFAULT_ALIGNMENT: usize = 8;

/// Maximum payload alignment (64 bytes)
/// Equals the block header size; payloads sit exactly one header past a
/// header offset, so any larger alignment could not be honored
pub const MAX_ALIGNMENT: usize = 64;

/// Minimum payload size a split remainder must be able to hold
/// Remainders smaller than this stay attached to the allocated block
pub const MIN_BLOCK_SIZE: usize = 16;

/// Number of size-class buckets in the free-list directory
pub const MAX_BUCKETS: usize = 32;

/// First doubling threshold for bucket indexing beyond the fixed table
/// Sizes above 4096 map to buckets 9.. by repeated doubling from here
pub const BUCKET_DOUBLING_BASE: usize = 8192;

/// Signature word written at both ends of every block header
/// A payload overrun clobbers the next header's leading signature first
pub const BLOCK_SIGNATURE: u32 = 0xCAFE_BABE;

/// Hard cap on chain-walk steps during validation
/// Turns a cyclic-corruption bug into a detected failure instead of a hang
pub const MAX_VALIDATE_STEPS: usize = 10_000;

/// Hard cap on blocks reported by a layout snapshot
pub const MAX_LAYOUT_BLOCKS: usize = 1_000;
