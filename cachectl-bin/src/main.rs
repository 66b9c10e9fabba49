mod debug;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cachectl::*;
use cachectl::trace::Trace;
use clap::Parser;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Bus transaction script to replay.
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Little-endian image loaded at address 0 of the backing store.
    #[arg(short, long)]
    image: Option<PathBuf>,

    #[arg(long, default_value_t = 64 * 1024)]
    dram_words: usize,

    #[arg(long, default_value_t = 1)]
    row_latency: usize,

    #[arg(long, default_value_t = 2)]
    write_latency: usize,

    /// Cycles to wait for an acknowledge before giving up.
    #[arg(long, default_value_t = 10_000)]
    stall_limit: usize,

    #[arg(short, long)]
    debug: bool,

    /// Raise the log level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = CacheConfig {
        dram_words:  args.dram_words,
        timing:      DramTiming {
            row_latency:   args.row_latency.max(1),
            write_latency: args.write_latency.max(1),
        },
        stall_limit: args.stall_limit,
    };
    let mut system = CacheSystem::new(config);

    if let Some(path) = &args.image {
        match std::fs::read(path) {
            Ok(bytes) => {
                let copied = system.load_image(0, &bytes);
                if copied < bytes.len() {
                    log::warn!("image truncated: {} of {} bytes loaded", copied, bytes.len());
                }
            },
            Err(e) => {
                eprintln!("Couldn't read image {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        }
    }

    if args.debug {
        debug::debug_mode(system.make_debugger());
        ExitCode::SUCCESS
    } else if let Some(path) = &args.trace {
        run(system, path)
    } else {
        eprintln!("Nothing to do: pass --trace or --debug.");
        ExitCode::FAILURE
    }
}

/// Replay a trace on the simulation thread.
fn run(system: CacheSystem, path: &Path) -> ExitCode {
    let script = match std::fs::read_to_string(path) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("Couldn't read trace {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        },
    };
    let trace = match Trace::parse_from_str(&script) {
        Ok(trace) => trace,
        Err(e) => {
            eprintln!("{}: {}", path.display(), e);
            return ExitCode::FAILURE;
        },
    };

    let start = chrono::Utc::now();
    let (port, handle) = system.spawn();

    let mut failed = false;
    if let Err(e) = port.reset() {
        eprintln!("Reset failed: {}", e);
        failed = true;
    }
    for line in trace.ops.iter() {
        if failed {
            break;
        }
        match line.op.issue(&port) {
            Ok(done) => {
                println!("{:>5}: {:<28} -> ${:04X} ({} cycles)", line.line, line.op.to_string(), done.data, done.cycles);
                if let Some(expect) = line.op.mismatch(&done) {
                    eprintln!("line {}: expected ${:04X}, read ${:04X}", line.line, expect, done.data);
                    failed = true;
                }
            },
            Err(e) => {
                eprintln!("line {}: {}", line.line, e);
                failed = true;
            },
        }
    }
    drop(port);

    let stats = match handle.join() {
        Ok(stats) => stats,
        Err(_) => {
            eprintln!("Simulation thread panicked.");
            return ExitCode::FAILURE;
        },
    };
    let elapsed = chrono::Utc::now().signed_duration_since(start);

    stats.print();
    println!("Elapsed: {}ms", elapsed.num_milliseconds());

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
