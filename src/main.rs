use std::path::PathBuf;
use std::process::ExitCode;

use sable::engine::Engine;
use sable::uci::UciSession;
use sable::AttackTables;

const DEFAULT_TABLE_FILE: &str = "attack_tables.json";

fn main() -> ExitCode {
    let path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_TABLE_FILE), PathBuf::from);

    let engine = match AttackTables::load(&path) {
        Ok(tables) => Engine::new(tables),
        Err(err) => {
            eprintln!("cannot load attack tables from {}: {err}", path.display());
            eprintln!("run gen_tables to create them");
            return ExitCode::FAILURE;
        }
    };

    let mut session = UciSession::new(engine);
    if let Err(err) = session.run() {
        eprintln!("stdin closed unexpectedly: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
