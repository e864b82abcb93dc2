//! Castling rights bitmask.

use super::piece::Color;

pub(crate) const CASTLE_WHITE_K: u8 = 0b0001;
pub(crate) const CASTLE_WHITE_Q: u8 = 0b0010;
pub(crate) const CASTLE_BLACK_K: u8 = 0b0100;
pub(crate) const CASTLE_BLACK_Q: u8 = 0b1000;

pub(crate) const CASTLE_ALL: u8 = 0b1111;

/// Bit for one side's castling right. `kingside` selects K vs Q.
#[inline]
pub(crate) const fn castle_bit(color: Color, kingside: bool) -> u8 {
    match (color, kingside) {
        (Color::White, true) => CASTLE_WHITE_K,
        (Color::White, false) => CASTLE_WHITE_Q,
        (Color::Black, true) => CASTLE_BLACK_K,
        (Color::Black, false) => CASTLE_BLACK_Q,
    }
}

/// Rights cleared when a piece moves from or to the given square index.
///
/// Moving the king clears both of that side's bits; moving (or capturing)
/// a corner rook clears the matching single bit.
pub(crate) const fn rights_cleared_by_square(sq_idx: usize) -> u8 {
    match sq_idx {
        0 => CASTLE_WHITE_Q,                 // a1
        4 => CASTLE_WHITE_K | CASTLE_WHITE_Q, // e1
        7 => CASTLE_WHITE_K,                 // h1
        56 => CASTLE_BLACK_Q,                // a8
        60 => CASTLE_BLACK_K | CASTLE_BLACK_Q, // e8
        63 => CASTLE_BLACK_K,                // h8
        _ => 0,
    }
}
