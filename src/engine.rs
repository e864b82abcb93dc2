//! Long-lived engine context tying the board, tables, and search together.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::board::attack_tables::TableError;
use crate::board::error::{FenError, MoveParseError};
use crate::board::types::Move;
use crate::board::{AttackTables, Board, MoveGenerator, RepetitionTracker};
use crate::search::{parallel_search, SearchLimits, SearchReport, DEFAULT_TT_MB};
use crate::tt::TranspositionTable;

/// A position could not be set. Setting a position never tears down the
/// engine; the previous position stays in place on error.
#[derive(Debug)]
pub enum PositionError {
    Fen(FenError),
    /// A move in the played-moves list was unparsable or illegal
    Move {
        index: usize,
        notation: String,
        source: MoveParseError,
    },
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionError::Fen(err) => write!(f, "invalid FEN: {err}"),
            PositionError::Move {
                index,
                notation,
                source,
            } => write!(f, "move {index} ({notation}): {source}"),
        }
    }
}

impl std::error::Error for PositionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PositionError::Fen(err) => Some(err),
            PositionError::Move { source, .. } => Some(source),
        }
    }
}

impl From<FenError> for PositionError {
    fn from(err: FenError) -> Self {
        PositionError::Fen(err)
    }
}

/// The engine: attack tables, shared transposition table, current position,
/// and the repetition history of the game so far.
pub struct Engine {
    tables: Arc<AttackTables>,
    tt: Arc<TranspositionTable>,
    board: Board,
    repetitions: RepetitionTracker,
    stop: Arc<AtomicBool>,
}

impl Engine {
    /// Build an engine around already-loaded attack tables.
    #[must_use]
    pub fn new(tables: AttackTables) -> Self {
        let board = Board::new();
        let mut repetitions = RepetitionTracker::new();
        repetitions.push(board.hash());
        Engine {
            tables: Arc::new(tables),
            tt: Arc::new(TranspositionTable::new(DEFAULT_TT_MB)),
            board,
            repetitions,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Build an engine from a persisted attack-table file. A missing or
    /// corrupt file is fatal at startup.
    pub fn from_table_file(path: &Path) -> Result<Self, TableError> {
        Ok(Engine::new(AttackTables::load(path)?))
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn tables(&self) -> &AttackTables {
        &self.tables
    }

    /// Set the position from a FEN plus a list of UCI moves played from it,
    /// reseeding the repetition history along the way. On error the engine
    /// keeps its previous position.
    pub fn set_position(&mut self, fen: &str, moves: &[&str]) -> Result<(), PositionError> {
        let mut board = Board::try_from_fen(fen)?;
        let mut repetitions = RepetitionTracker::new();
        repetitions.push(board.hash());

        let generator = MoveGenerator::new(&self.tables);
        for (index, notation) in moves.iter().enumerate() {
            let legal = generator.generate(&board).moves;
            let mv = Board::parse_uci_move(notation, &legal).map_err(|source| {
                PositionError::Move {
                    index,
                    notation: (*notation).to_string(),
                    source,
                }
            })?;
            board.make_move(mv);
            repetitions.push(board.hash());
        }

        self.board = board;
        self.repetitions = repetitions;
        Ok(())
    }

    /// Search the current position to `depth` and return the voted best
    /// move. `None` means the game is over (checkmate or stalemate).
    #[must_use]
    pub fn find_best_move(&self, depth: u32) -> Option<Move> {
        self.search(SearchLimits::depth(depth)).best_move
    }

    /// Full search with explicit limits (depth and optional time budget).
    pub fn search(&self, limits: SearchLimits) -> SearchReport {
        self.stop.store(false, Ordering::Relaxed);
        parallel_search(
            &self.board,
            &self.tables,
            &self.tt,
            &self.stop,
            &self.repetitions,
            limits,
        )
    }

    /// Ask all running search lanes to stop. Idempotent; safe to call with
    /// no search in flight.
    pub fn cancel_search(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Handle to the cancellation flag, for callers that need to stop a
    /// search without holding a reference to the engine itself.
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Leaf count of the legal move tree, for validation.
    pub fn perft(&mut self, depth: usize) -> u64 {
        let generator = MoveGenerator::new(&self.tables);
        let mut board = self.board.clone();
        generator.perft(&mut board, depth)
    }
}
