/*!
 * Interactive Shell
 * Read-eval loop driving a pool from textual commands
 */

mod command;
pub mod report;

pub use command::Command;

use std::io::{self, BufRead, Write};
use std::ptr::NonNull;

use log::warn;

use crate::demo;
use crate::pool::Pool;

const HELP: &str = "\
Commands:
  alloc <size>    - Allocate memory
  free <address>  - Free memory
  stats [json]    - Show pool statistics
  layout          - Dump memory layout
  validate        - Validate pool integrity
  test            - Run automated tests
  help            - Show this help
  quit            - Exit";

/// Run the interactive loop until `quit` or end of input.
///
/// Allocations made here are deliberately left outstanding on exit; the
/// caller's final destroy reports them as leaks, same as any other caller
/// who forgets to free.
pub fn run(pool: &mut Pool) {
    println!("\n=== Interactive Memory Pool ===");
    println!("{}", HELP);
    println!("===============================");

    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("\npool> ");
        let _ = io::stdout().flush();

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("failed to read command: {}", e);
                break;
            }
        }

        let parsed = match Command::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                println!("Error: {}", msg);
                println!("Type 'help' for available commands");
                continue;
            }
        };

        match parsed {
            Command::Alloc(size) => match pool.allocate(size) {
                Ok(ptr) => println!("Allocated {} bytes at {:p}", size, ptr.as_ptr()),
                Err(e) => println!("Error: {}", e),
            },
            Command::Free(address) => {
                let Some(ptr) = NonNull::new(address as *mut u8) else {
                    println!("Error: invalid address");
                    continue;
                };
                match pool.deallocate(ptr) {
                    Ok(()) => println!("Freed memory at {:#x}", address),
                    Err(e) => println!("Error: {}", e),
                }
            }
            Command::Stats { json } => {
                let stats = pool.stats();
                if json {
                    match serde_json::to_string_pretty(&stats) {
                        Ok(rendered) => println!("{}", rendered),
                        Err(e) => println!("Error: {}", e),
                    }
                } else {
                    print!("{}", report::render_stats(pool.name(), &stats));
                }
            }
            Command::Layout => match pool.blocks() {
                Ok(layout) => print!("{}", report::render_layout(pool.name(), &layout)),
                Err(e) => println!("Error: {}", e),
            },
            Command::Validate => match pool.validate() {
                Ok(()) => println!("Pool validation: PASSED"),
                Err(e) => println!("Pool validation: FAILED ({})", e),
            },
            Command::Test => {
                let name = pool.name().to_string();
                demo::run(pool, &name);
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }
}
