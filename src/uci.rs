//! Thin UCI front-end.
//!
//! Only the command subset the engine needs: `position`, `go depth`,
//! `go movetime`, `stop`, `perft`, and the handshake. Malformed input is
//! reported and skipped, never fatal.

use std::fmt;
use std::io::{self, BufRead};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::board::START_FEN;
use crate::engine::Engine;
use crate::search::SearchLimits;

const DEFAULT_GO_DEPTH: u32 = 7;

#[derive(Debug)]
pub enum UciError {
    MissingArgument { command: &'static str },
    BadNumber { argument: String },
    BadFen { fen: String },
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciError::MissingArgument { command } => {
                write!(f, "'{command}' is missing an argument")
            }
            UciError::BadNumber { argument } => write!(f, "'{argument}' is not a number"),
            UciError::BadFen { fen } => write!(f, "unusable fen '{fen}'"),
        }
    }
}

impl std::error::Error for UciError {}

/// One UCI session: the engine behind a lock, plus the running search
/// thread if any. `stop` is shared with the lanes so it works while the
/// engine lock is held by the searcher.
pub struct UciSession {
    engine: Arc<Mutex<Engine>>,
    stop: Arc<AtomicBool>,
    searcher: Option<JoinHandle<()>>,
}

impl UciSession {
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        let stop = engine.stop_handle();
        UciSession {
            engine: Arc::new(Mutex::new(engine)),
            stop,
            searcher: None,
        }
    }

    /// Read commands from stdin until `quit`.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            if !self.handle_line(&line) {
                break;
            }
        }
        self.finish_search();
        Ok(())
    }

    /// Handle one command line. Returns false on `quit`.
    pub fn handle_line(&mut self, line: &str) -> bool {
        let parts: Vec<&str> = line.trim().split_whitespace().collect();
        if parts.is_empty() {
            return true;
        }

        match parts[0] {
            "uci" => {
                println!("id name sable");
                println!("uciok");
            }
            "isready" => {
                // wait out any running search so the position is settled
                self.finish_search();
                println!("readyok");
            }
            "ucinewgame" => {
                self.finish_search();
                if let Err(err) = self.engine.lock().set_position(START_FEN, &[]) {
                    log::warn!("resetting position: {err}");
                }
            }
            "position" => {
                self.finish_search();
                if let Err(err) = self.handle_position(&parts) {
                    eprintln!("info string {err}");
                }
            }
            "go" => match parse_go(&parts) {
                Ok(limits) => self.start_search(limits),
                Err(err) => eprintln!("info string {err}"),
            },
            "stop" => {
                self.stop.store(true, std::sync::atomic::Ordering::Relaxed);
                self.finish_search();
            }
            "perft" => match parse_number(parts.get(1), "perft") {
                Ok(depth) => {
                    let nodes = self.engine.lock().perft(depth as usize);
                    println!("perft {depth}: {nodes}");
                }
                Err(err) => eprintln!("info string {err}"),
            },
            "quit" => return false,
            other => log::debug!("ignoring unknown command '{other}'"),
        }
        true
    }

    fn handle_position(&mut self, parts: &[&str]) -> Result<(), Box<dyn std::error::Error>> {
        let mut idx = 1;
        let fen: String = match parts.get(idx) {
            Some(&"startpos") => {
                idx += 1;
                START_FEN.to_string()
            }
            Some(&"fen") => {
                let end = parts
                    .iter()
                    .position(|&p| p == "moves")
                    .unwrap_or(parts.len());
                if end <= idx + 1 {
                    return Err(Box::new(UciError::BadFen {
                        fen: String::new(),
                    }));
                }
                let fen = parts[idx + 1..end].join(" ");
                idx = end;
                fen
            }
            _ => {
                return Err(Box::new(UciError::MissingArgument {
                    command: "position",
                }))
            }
        };

        let moves: &[&str] = if parts.get(idx) == Some(&"moves") {
            &parts[idx + 1..]
        } else {
            &[]
        };
        self.engine.lock().set_position(&fen, moves)?;
        Ok(())
    }

    fn start_search(&mut self, limits: SearchLimits) {
        self.finish_search();
        let engine = Arc::clone(&self.engine);
        let handle = thread::Builder::new()
            .name("uci-search".to_string())
            .spawn(move || {
                let report = engine.lock().search(limits);
                match report.best_move {
                    Some(mv) => println!("bestmove {mv}"),
                    None => println!("bestmove 0000"),
                }
            });
        match handle {
            Ok(handle) => self.searcher = Some(handle),
            Err(err) => log::warn!("failed to spawn search thread: {err}"),
        }
    }

    fn finish_search(&mut self) {
        if let Some(handle) = self.searcher.take() {
            if handle.join().is_err() {
                log::warn!("search thread panicked");
            }
        }
    }
}

fn parse_number(part: Option<&&str>, command: &'static str) -> Result<u64, UciError> {
    let raw = part.ok_or(UciError::MissingArgument { command })?;
    raw.parse().map_err(|_| UciError::BadNumber {
        argument: (*raw).to_string(),
    })
}

fn parse_go(parts: &[&str]) -> Result<SearchLimits, UciError> {
    let mut limits = SearchLimits::depth(DEFAULT_GO_DEPTH);
    let mut idx = 1;
    while idx < parts.len() {
        match parts[idx] {
            "depth" => {
                limits.depth = parse_number(parts.get(idx + 1), "go depth")? as u32;
                idx += 2;
            }
            "movetime" => {
                let ms = parse_number(parts.get(idx + 1), "go movetime")?;
                limits = limits.with_movetime(Duration::from_millis(ms));
                idx += 2;
            }
            other => {
                log::debug!("ignoring go argument '{other}'");
                idx += 1;
            }
        }
    }
    Ok(limits)
}
