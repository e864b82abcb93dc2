pub mod board;
pub mod engine;
pub mod search;
pub mod tt;
pub mod uci;
pub mod zobrist;

pub use board::types::{Bitboard, Color, Move, Piece, Square};
pub use board::{AttackTables, Board, GeneratedMoves, MoveGenerator, RepetitionTracker};
pub use engine::Engine;
pub use tt::TranspositionTable;
