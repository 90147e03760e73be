/*!
 * Reports
 * Human-readable rendering of statistics and layout snapshots
 */

use std::fmt::Write;

use crate::pool::{BlockInfo, PoolStats};

/// Render a statistics snapshot the way the `stats` command prints it.
pub fn render_stats(name: &str, stats: &PoolStats) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\n=== Memory Pool Statistics: {} ===", name);
    let _ = writeln!(out, "Total size: {} bytes", stats.total_size);
    let _ = writeln!(
        out,
        "Used size: {} bytes ({:.1}%)",
        stats.used_size, stats.usage_percentage
    );
    let _ = writeln!(
        out,
        "Peak usage: {} bytes ({:.1}%)",
        stats.peak_usage,
        stats.peak_usage as f64 * 100.0 / stats.total_size as f64
    );
    let _ = writeln!(out, "Free size: {} bytes", stats.available);
    let _ = writeln!(out, "Total blocks: {}", stats.block_count);
    let _ = writeln!(out, "Free blocks: {}", stats.free_blocks);
    let _ = writeln!(out, "Largest free: {} bytes", stats.largest_free_block);
    let _ = writeln!(out, "Allocations: {}", stats.allocation_count);
    let _ = writeln!(out, "Deallocations: {}", stats.deallocation_count);
    let _ = writeln!(out, "Active allocations: {}", stats.outstanding());
    let _ = writeln!(out, "Fragmentation ratio: {}%", stats.fragmentation_ratio);
    let _ = writeln!(out, "==============================");

    out
}

/// Render a layout snapshot, one line per block.
pub fn render_layout(name: &str, layout: &[BlockInfo]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\n=== Memory Pool Layout: {} ===", name);
    for (number, block) in layout.iter().enumerate() {
        let _ = writeln!(
            out,
            "Block {}: {}, Size: {} bytes, Offset: {:#x}",
            number,
            if block.free { "FREE" } else { "USED" },
            block.size,
            block.offset
        );
    }
    let _ = writeln!(out, "============================");

    out
}
