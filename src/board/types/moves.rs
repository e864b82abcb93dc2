//! Move types and move list.

use std::fmt;
use std::ops::Index;

use super::piece::Piece;
use super::square::Square;

// Move flags (4 bits, values 0-15)
const FLAG_QUIET: u32 = 0;
const FLAG_DOUBLE_PAWN: u32 = 1;
const FLAG_CASTLE_KINGSIDE: u32 = 2;
const FLAG_CASTLE_QUEENSIDE: u32 = 3;
const FLAG_CAPTURE: u32 = 4;
const FLAG_EN_PASSANT: u32 = 5;
// 6-7 reserved
const FLAG_PROMO_KNIGHT: u32 = 8;
const FLAG_PROMO_BISHOP: u32 = 9;
const FLAG_PROMO_ROOK: u32 = 10;
const FLAG_PROMO_QUEEN: u32 = 11;
const FLAG_PROMO_CAPTURE_KNIGHT: u32 = 12;
const FLAG_PROMO_CAPTURE_BISHOP: u32 = 13;
const FLAG_PROMO_CAPTURE_ROOK: u32 = 14;
const FLAG_PROMO_CAPTURE_QUEEN: u32 = 15;

/// No-capture marker for the captured-piece field
const NO_PIECE: u32 = 7;

/// Compact move representation.
///
/// Encoding:
/// - bits 0-5:   from square (0-63)
/// - bits 6-11:  to square (0-63)
/// - bits 12-15: flags (move type)
/// - bits 16-18: moved piece kind
/// - bits 19-21: captured piece kind (7 = none)
///
/// A value of 0 is the null-move sentinel (it would decode as a quiet
/// pawn move a1-a1, which no legal position produces).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u32);

impl Move {
    /// The null-move sentinel ("no move")
    #[inline]
    #[must_use]
    pub const fn null() -> Self {
        Move(0)
    }

    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Create a quiet move
    #[inline]
    #[must_use]
    pub const fn quiet(from: Square, to: Square, piece: Piece) -> Self {
        Move::encode(from, to, FLAG_QUIET, piece, None)
    }

    /// Create a capture move
    #[inline]
    #[must_use]
    pub const fn capture(from: Square, to: Square, piece: Piece, victim: Piece) -> Self {
        Move::encode(from, to, FLAG_CAPTURE, piece, Some(victim))
    }

    /// Create a double pawn push
    #[inline]
    #[must_use]
    pub const fn double_pawn_push(from: Square, to: Square) -> Self {
        Move::encode(from, to, FLAG_DOUBLE_PAWN, Piece::Pawn, None)
    }

    /// Create an en passant capture
    #[inline]
    #[must_use]
    pub const fn en_passant(from: Square, to: Square) -> Self {
        Move::encode(from, to, FLAG_EN_PASSANT, Piece::Pawn, Some(Piece::Pawn))
    }

    /// Create a kingside castle
    #[inline]
    #[must_use]
    pub const fn castle_kingside(from: Square, to: Square) -> Self {
        Move::encode(from, to, FLAG_CASTLE_KINGSIDE, Piece::King, None)
    }

    /// Create a queenside castle
    #[inline]
    #[must_use]
    pub const fn castle_queenside(from: Square, to: Square) -> Self {
        Move::encode(from, to, FLAG_CASTLE_QUEENSIDE, Piece::King, None)
    }

    /// Create a promotion, capturing or not
    #[inline]
    #[must_use]
    pub const fn promotion(from: Square, to: Square, promo: Piece, victim: Option<Piece>) -> Self {
        let base = match promo {
            Piece::Knight => FLAG_PROMO_KNIGHT,
            Piece::Bishop => FLAG_PROMO_BISHOP,
            Piece::Rook => FLAG_PROMO_ROOK,
            _ => FLAG_PROMO_QUEEN,
        };
        let flag = match victim {
            Some(_) => base + 4,
            None => base,
        };
        Move::encode(from, to, flag, Piece::Pawn, victim)
    }

    #[inline]
    const fn encode(from: Square, to: Square, flag: u32, piece: Piece, victim: Option<Piece>) -> Self {
        let captured = match victim {
            Some(p) => p.index() as u32,
            None => NO_PIECE,
        };
        Move(
            from.as_index() as u32
                | ((to.as_index() as u32) << 6)
                | (flag << 12)
                | ((piece.index() as u32) << 16)
                | (captured << 19),
        )
    }

    /// Get the source square
    #[inline]
    #[must_use]
    pub const fn from(self) -> Square {
        Square::from_index_const((self.0 & 0x3F) as usize)
    }

    /// Get the destination square
    #[inline]
    #[must_use]
    pub const fn to(self) -> Square {
        Square::from_index_const(((self.0 >> 6) & 0x3F) as usize)
    }

    #[inline]
    const fn flag(self) -> u32 {
        (self.0 >> 12) & 0xF
    }

    /// The kind of piece being moved
    #[inline]
    #[must_use]
    pub const fn piece(self) -> Piece {
        Piece::from_index(((self.0 >> 16) & 0x7) as usize)
    }

    /// The kind of piece captured, if any (en passant captures a pawn)
    #[inline]
    #[must_use]
    pub const fn captured(self) -> Option<Piece> {
        let idx = ((self.0 >> 19) & 0x7) as usize;
        if idx == NO_PIECE as usize {
            None
        } else {
            Some(Piece::from_index(idx))
        }
    }

    /// Returns true if this move captures a piece (including en passant)
    #[inline]
    #[must_use]
    pub const fn is_capture(self) -> bool {
        ((self.0 >> 19) & 0x7) != NO_PIECE
    }

    #[inline]
    #[must_use]
    pub const fn is_en_passant(self) -> bool {
        self.flag() == FLAG_EN_PASSANT
    }

    /// The square of the pawn removed by an en passant capture, if any
    #[inline]
    #[must_use]
    pub const fn en_passant_victim(self) -> Option<Square> {
        if self.is_en_passant() {
            // captured pawn sits on the mover's origin rank, destination file
            Some(Square(self.from().0, self.to().1))
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_castling(self) -> bool {
        let f = self.flag();
        f == FLAG_CASTLE_KINGSIDE || f == FLAG_CASTLE_QUEENSIDE
    }

    #[inline]
    #[must_use]
    pub const fn is_castle_kingside(self) -> bool {
        self.flag() == FLAG_CASTLE_KINGSIDE
    }

    #[inline]
    #[must_use]
    pub const fn is_double_pawn_push(self) -> bool {
        self.flag() == FLAG_DOUBLE_PAWN
    }

    #[inline]
    #[must_use]
    pub const fn is_promotion(self) -> bool {
        self.flag() >= FLAG_PROMO_KNIGHT
    }

    /// Get the promotion piece, if this is a promotion move
    #[inline]
    #[must_use]
    pub const fn promotion_piece(self) -> Option<Piece> {
        match self.flag() {
            FLAG_PROMO_KNIGHT | FLAG_PROMO_CAPTURE_KNIGHT => Some(Piece::Knight),
            FLAG_PROMO_BISHOP | FLAG_PROMO_CAPTURE_BISHOP => Some(Piece::Bishop),
            FLAG_PROMO_ROOK | FLAG_PROMO_CAPTURE_ROOK => Some(Piece::Rook),
            FLAG_PROMO_QUEEN | FLAG_PROMO_CAPTURE_QUEEN => Some(Piece::Queen),
            _ => None,
        }
    }

    /// Returns true for non-capture, non-promotion moves
    #[inline]
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        !self.is_capture() && !self.is_promotion()
    }

    /// Raw value for packed storage (transposition table)
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Rebuild from packed storage
    #[inline]
    #[must_use]
    pub const fn from_u32(value: u32) -> Self {
        Move(value)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "Move(null)");
        }
        write!(f, "Move({}{}{}", self.piece(), self.from(), self.to())?;
        if let Some(promo) = self.promotion_piece() {
            write!(f, "={}", promo.to_char().to_ascii_uppercase())?;
        }
        if self.is_en_passant() {
            write!(f, " ep")?;
        } else if self.is_capture() {
            write!(f, " cap")?;
        }
        if self.is_castling() {
            write!(f, " castle")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Move {
    /// UCI algebraic form: origin, destination, optional lowercase promotion letter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(promo) = self.promotion_piece() {
            write!(f, "{}", promo.to_char())?;
        }
        Ok(())
    }
}

pub(crate) const MAX_MOVES: usize = 256;
pub(crate) const MAX_PLY: usize = 128;

/// List of moves with fixed-size backing array.
#[derive(Clone, Debug)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl MoveList {
    pub(crate) fn new() -> Self {
        MoveList {
            moves: [Move::null(); MAX_MOVES],
            len: 0,
        }
    }

    pub(crate) fn push(&mut self, mv: Move) {
        self.moves[self.len] = mv;
        self.len += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().contains(&mv)
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl Default for MoveList {
    fn default() -> Self {
        MoveList::new()
    }
}

impl Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, idx: usize) -> &Self::Output {
        assert!(
            idx < self.len,
            "MoveList index {} out of bounds (len {})",
            idx,
            self.len
        );
        &self.moves[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_quiet() {
        let mv = Move::quiet(Square(1, 4), Square(3, 4), Piece::Pawn);
        assert_eq!(mv.from(), Square(1, 4));
        assert_eq!(mv.to(), Square(3, 4));
        assert_eq!(mv.piece(), Piece::Pawn);
        assert_eq!(mv.captured(), None);
        assert!(mv.is_quiet());
    }

    #[test]
    fn encode_decode_capture() {
        let mv = Move::capture(Square(3, 3), Square(4, 4), Piece::Bishop, Piece::Knight);
        assert!(mv.is_capture());
        assert_eq!(mv.captured(), Some(Piece::Knight));
        assert_eq!(mv.piece(), Piece::Bishop);
    }

    #[test]
    fn promotion_display_is_lowercase() {
        let mv = Move::promotion(Square(6, 0), Square(7, 0), Piece::Queen, None);
        assert_eq!(mv.to_string(), "a7a8q");
        assert_eq!(mv.promotion_piece(), Some(Piece::Queen));
        assert!(!mv.is_quiet());
    }

    #[test]
    fn en_passant_victim_square() {
        // white pawn e5 takes d6 en passant; victim pawn sits on d5
        let mv = Move::en_passant(Square(4, 4), Square(5, 3));
        assert_eq!(mv.en_passant_victim(), Some(Square(4, 3)));
        assert_eq!(mv.captured(), Some(Piece::Pawn));
    }

    #[test]
    fn null_move_round_trips_through_u32() {
        assert!(Move::from_u32(Move::null().as_u32()).is_null());
        let mv = Move::castle_kingside(Square(0, 4), Square(0, 6));
        assert_eq!(Move::from_u32(mv.as_u32()), mv);
    }
}
