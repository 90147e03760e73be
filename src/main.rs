/*!
 * mempool - Main Entry Point
 *
 * Command-line front end for the pool allocator:
 * - Interactive shell mode
 * - Scripted demo/test mode
 * - Statistics and layout reporting
 */

use std::env;
use std::process::ExitCode;

use log::LevelFilter;

use mempool::core::limits::{DEFAULT_ALIGNMENT, DEFAULT_POOL_SIZE};
use mempool::shell::report;
use mempool::{demo, shell, Pool};

struct Options {
    size: usize,
    alignment: usize,
    name: String,
    interactive: bool,
    run_tests: bool,
    debug: bool,
    help: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            size: DEFAULT_POOL_SIZE,
            alignment: DEFAULT_ALIGNMENT,
            name: "default".to_string(),
            interactive: false,
            run_tests: false,
            debug: false,
            help: false,
        }
    }
}

fn usage(program: &str) {
    println!("Memory Pool Allocator");
    println!("Usage: {} [options]\n", program);
    println!("Options:");
    println!("  -s, --size <bytes>      Pool size (default: 1MB)");
    println!("  -a, --alignment <bytes> Memory alignment (default: 8)");
    println!("  -n, --name <name>       Pool name (default: 'default')");
    println!("  -i, --interactive       Run in interactive mode");
    println!("  -t, --test              Run automated tests");
    println!("  -d, --debug             Enable debug output");
    println!("  --help                  Show this help");
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" => options.help = true,
            "-s" | "--size" => {
                let value = iter.next().ok_or("size value required")?;
                options.size = value
                    .parse()
                    .map_err(|_| format!("invalid pool size: {}", value))?;
                if options.size == 0 {
                    return Err("invalid pool size: 0".to_string());
                }
            }
            "-a" | "--alignment" => {
                let value = iter.next().ok_or("alignment value required")?;
                let alignment: usize = value
                    .parse()
                    .map_err(|_| format!("invalid alignment: {}", value))?;
                if !alignment.is_power_of_two() {
                    return Err("invalid alignment (must be power of 2)".to_string());
                }
                options.alignment = alignment;
            }
            "-n" | "--name" => {
                options.name = iter.next().ok_or("pool name required")?.clone();
            }
            "-i" | "--interactive" => options.interactive = true,
            "-t" | "--test" => options.run_tests = true,
            "-d" | "--debug" => options.debug = true,
            other => return Err(format!("unknown option: {}", other)),
        }
    }

    Ok(options)
}

fn init_logging(debug: bool) {
    env_logger::Builder::from_default_env()
        .filter_level(if debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("mempool");

    let options = match parse_args(&args[1..]) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            usage(program);
            return ExitCode::FAILURE;
        }
    };

    if options.help {
        usage(program);
        return ExitCode::SUCCESS;
    }

    init_logging(options.debug);

    let mut pool = match Pool::init(options.size, options.alignment, &options.name) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Error: failed to initialize memory pool: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Memory pool initialized: {} ({} bytes, {}-byte alignment)",
        pool.name(),
        pool.total_size(),
        pool.alignment()
    );

    let name = pool.name().to_string();
    if options.interactive {
        shell::run(&mut pool);
    } else if options.run_tests {
        demo::run(&mut pool, &name);
    } else {
        println!("\nRunning basic demonstration...");
        print!("{}", report::render_stats(&name, &pool.stats()));
        demo::run(&mut pool, &name);
    }

    let failed = pool.validate().is_err();
    if failed {
        eprintln!("Error: pool validation failed");
    }
    pool.destroy();

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
