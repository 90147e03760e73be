/*!
 * Core Types
 * Common types used across the allocator
 */

/// Size type for memory quantities
pub type Size = usize;

/// Byte offset of a block header within the arena
pub type Offset = usize;

/// Sentinel offset marking the absence of a link
pub const NIL: Offset = usize::MAX;
