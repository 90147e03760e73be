/*!
 * Demo Driver
 * Scripted workload exercising allocation, integrity, and reclamation
 */

use std::ptr::NonNull;

use crate::pool::{BlockAllocator, PoolInspect};
use crate::shell::report;

/// Size ladder covering every fixed bucket threshold.
const TEST_SIZES: [usize; 8] = [16, 32, 64, 128, 256, 512, 1024, 2048];

/// Run the scripted exercise against any allocator.
///
/// Allocates the whole ladder, stamps and verifies payload patterns, frees
/// alternating blocks, reallocates them at double size, then returns
/// everything, printing statistics between phases.
pub fn run<P: BlockAllocator + PoolInspect>(pool: &mut P, name: &str) {
    println!("\n=== Testing Memory Pool ===");

    let mut payloads: Vec<Option<NonNull<u8>>> = vec![None; TEST_SIZES.len()];

    println!("Testing allocation...");
    for (i, &size) in TEST_SIZES.iter().enumerate() {
        match pool.allocate(size) {
            Ok(ptr) => {
                println!("  Allocated {} bytes at {:p}", size, ptr.as_ptr());
                unsafe {
                    ptr.as_ptr().write_bytes((i + 1) as u8, size);
                }
                payloads[i] = Some(ptr);
            }
            Err(e) => println!("  Failed to allocate {} bytes: {}", size, e),
        }
    }

    print!("{}", report::render_stats(name, &pool.stats()));

    println!("\nTesting data integrity...");
    for (i, &size) in TEST_SIZES.iter().enumerate() {
        if let Some(ptr) = payloads[i] {
            let intact = (0..size)
                .all(|j| unsafe { ptr.as_ptr().add(j).read() } == (i + 1) as u8);
            println!("  Block {}: {}", i, if intact { "valid" } else { "corrupted" });
        }
    }

    println!("\nTesting deallocation...");
    for i in (0..TEST_SIZES.len()).step_by(2) {
        if let Some(ptr) = payloads[i].take() {
            match pool.deallocate(ptr) {
                Ok(()) => println!("  Freed block {}", i),
                Err(e) => println!("  Failed to free block {}: {}", i, e),
            }
        }
    }

    print!("{}", report::render_stats(name, &pool.stats()));

    println!("\nTesting reallocation...");
    for i in (0..TEST_SIZES.len()).step_by(2) {
        let size = TEST_SIZES[i] * 2;
        match pool.allocate(size) {
            Ok(ptr) => {
                println!("  Reallocated {} bytes at {:p}", size, ptr.as_ptr());
                payloads[i] = Some(ptr);
            }
            Err(e) => println!("  Failed to reallocate {} bytes: {}", size, e),
        }
    }

    print!("{}", report::render_stats(name, &pool.stats()));

    println!("\nCleaning up...");
    for slot in &mut payloads {
        if let Some(ptr) = slot.take() {
            if let Err(e) = pool.deallocate(ptr) {
                println!("  Cleanup free failed: {}", e);
            }
        }
    }

    print!("{}", report::render_stats(name, &pool.stats()));

    match pool.validate() {
        Ok(()) => println!("Pool validation: PASSED"),
        Err(e) => println!("Pool validation: FAILED ({})", e),
    }
    println!("=========================");
}
