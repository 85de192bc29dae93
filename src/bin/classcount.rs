//! Companion histogrammer.
//!
//! Reads a trace file of whitespace-separated size-class indices (0..=12,
//! one per allocation event) and prints a per-class count plus a grand
//! total. Grounded in `classcount.c`'s bucket-and-total report, adapted to
//! this crate's 13-class table and to reading the path from `argv[1]`
//! instead of a hardcoded file name.

use std::env;
use std::fs;
use std::process::ExitCode;

const NUM_CLASSES: usize = 13;

fn main() -> ExitCode {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "classcount".to_string());
    let Some(path) = args.next() else {
        eprintln!("usage: {program} <trace-file>");
        return ExitCode::FAILURE;
    };

    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) => {
            eprintln!("classcount: could not read {path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut counts = [0u64; NUM_CLASSES];
    let mut total = 0u64;
    for token in contents.split_whitespace() {
        match token.parse::<usize>() {
            Ok(class) if class < NUM_CLASSES => {
                counts[class] += 1;
                total += 1;
            }
            Ok(class) => eprintln!("classcount: ignoring out-of-range class {class}"),
            Err(_) => eprintln!("classcount: ignoring malformed record {token:?}"),
        }
    }

    for (class, count) in counts.iter().enumerate() {
        print!("SIZE{class}:{count}\t");
    }
    println!("total allocations: {total}");
    ExitCode::SUCCESS
}
