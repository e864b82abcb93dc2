//! Offline magic-table generation.
//!
//! Runs the Las-Vegas magic search for every square and writes the result
//! to a JSON file the engine loads at startup. Regeneration is only needed
//! when the table format changes.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use sable::AttackTables;

const DEFAULT_TABLE_FILE: &str = "attack_tables.json";

fn main() -> ExitCode {
    let path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_TABLE_FILE), PathBuf::from);

    let start = Instant::now();
    let tables = AttackTables::generate();
    println!(
        "generated {} attack entries in {:.2}s",
        tables.entry_count(),
        start.elapsed().as_secs_f64()
    );

    if let Err(err) = tables.save(&path) {
        eprintln!("cannot write {}: {err}", path.display());
        return ExitCode::FAILURE;
    }
    println!("wrote {}", path.display());
    ExitCode::SUCCESS
}
