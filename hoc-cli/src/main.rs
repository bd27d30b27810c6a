//! hoc CLI: run, disassemble and inspect stack-machine programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input/assembly/configuration error
//! - 3: At least one statement failed at run time

mod commands;

use std::process;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => commands::run(&args[2..]),
        "disassemble" => commands::disassemble(&args[2..]),
        "symbols" => commands::symbols(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` overrides the default `warn` filter; `RUST_LOG=hoc_vm=trace`
/// logs every dispatched instruction.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    eprintln!("Usage: hoc <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <input.hoc>           Emit and execute each statement");
    eprintln!("  disassemble <input.hoc>   Emit each statement and print its code");
    eprintln!("  symbols                   List the built-in environment");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  HOC_STACK   value stack capacity (default 256)");
    eprintln!("  HOC_CODE    code segment capacity (default 2000)");
    eprintln!("  RUST_LOG    log filter (default warn)");
}
