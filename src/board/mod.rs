//! Board representation, rules, and legal move generation.

pub mod attack_tables;
pub mod error;
pub mod eval;
mod fen;
mod make_unmake;
pub mod movegen;
mod repetition;
mod state;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;
#[cfg(test)]
mod tests;

pub use attack_tables::AttackTables;
pub use fen::START_FEN;
pub use movegen::{GeneratedMoves, MoveGenerator};
pub use repetition::RepetitionTracker;
pub use state::{Board, UnmakeInfo};
