//! Core value types for the board: bitboards, squares, pieces, moves.

mod bitboard;
mod castling;
mod moves;
mod piece;
mod square;

pub use bitboard::{Bitboard, BitboardIter};
pub use moves::{Move, MoveList};
pub use piece::{Color, Piece};
pub use square::Square;

pub(crate) use bitboard::bit_for_square;
pub(crate) use castling::{
    castle_bit, rights_cleared_by_square, CASTLE_ALL, CASTLE_BLACK_K, CASTLE_BLACK_Q,
    CASTLE_WHITE_K, CASTLE_WHITE_Q,
};
pub(crate) use moves::MAX_PLY;
pub(crate) use piece::PROMOTION_PIECES;
pub(crate) use square::{file_to_index, rank_to_index};
