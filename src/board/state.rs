//! Board state: piece bitboards, castling rights, en passant, running hash.

use crate::zobrist::ZOBRIST;

use super::types::{
    bit_for_square, Bitboard, Color, Piece, Square, CASTLE_ALL,
};

/// Restoration data returned by `make_move`, consumed by `unmake_move`.
///
/// The search keeps one of these per ply on its stack instead of copying
/// whole positions; applying and reverting a move touches only the deltas.
#[derive(Clone, Debug)]
pub struct UnmakeInfo {
    pub(crate) previous_en_passant_target: Option<Square>,
    pub(crate) previous_castling_rights: u8,
    pub(crate) previous_hash: u64,
    pub(crate) previous_halfmove_clock: u32,
}

/// A chess position.
///
/// Six piece bitboards per side plus derived occupancy boards, side to move,
/// castling rights, optional en passant target, and an incrementally
/// maintained Zobrist hash.
#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) occupied: [Bitboard; 2],
    pub(crate) all_occupied: Bitboard,
    pub(crate) white_to_move: bool,
    pub(crate) en_passant_target: Option<Square>,
    pub(crate) castling_rights: u8,
    pub(crate) hash: u64,
    pub(crate) halfmove_clock: u32,
}

impl Board {
    /// The standard starting position.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Board::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in back_rank.iter().enumerate() {
            board.set_piece(Square(0, file), Color::White, *piece);
            board.set_piece(Square(7, file), Color::Black, *piece);
            board.set_piece(Square(1, file), Color::White, Piece::Pawn);
            board.set_piece(Square(6, file), Color::Black, Piece::Pawn);
        }

        board.castling_rights = CASTLE_ALL;
        board.white_to_move = true;
        board.hash = board.calculate_hash();
        board
    }

    pub(crate) fn empty() -> Self {
        Board {
            pieces: [[Bitboard(0); 6]; 2],
            occupied: [Bitboard(0); 2],
            all_occupied: Bitboard(0),
            white_to_move: true,
            en_passant_target: None,
            castling_rights: 0,
            hash: 0,
            halfmove_clock: 0,
        }
    }

    /// The position's Zobrist hash (incrementally maintained).
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[must_use]
    pub fn white_to_move(&self) -> bool {
        self.white_to_move
    }

    /// The color whose turn it is.
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        if self.white_to_move {
            Color::White
        } else {
            Color::Black
        }
    }

    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[must_use]
    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    /// Squares occupied by the given color.
    #[must_use]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.occupied[color.index()]
    }

    /// All occupied squares.
    #[must_use]
    pub fn occupied_all(&self) -> Bitboard {
        self.all_occupied
    }

    /// Bitboard of one piece kind for one side.
    #[must_use]
    pub fn piece_board(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    /// Square of the given side's king.
    ///
    /// A position always holds exactly one king per side; this is checked at
    /// construction and is a programming error if violated later.
    #[must_use]
    pub fn king_square(&self, color: Color) -> Square {
        let kings = self.pieces[color.index()][Piece::King.index()];
        debug_assert_eq!(kings.popcount(), 1, "side must have exactly one king");
        Square::from_index_const(kings.0.trailing_zeros() as usize)
    }

    pub(crate) fn set_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let bit = bit_for_square(sq).0;
        let c_idx = color.index();
        self.pieces[c_idx][piece.index()].0 |= bit;
        self.occupied[c_idx].0 |= bit;
        self.all_occupied.0 |= bit;
    }

    pub(crate) fn remove_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let bit = bit_for_square(sq).0;
        let c_idx = color.index();
        self.pieces[c_idx][piece.index()].0 &= !bit;
        self.occupied[c_idx].0 &= !bit;
        self.all_occupied.0 &= !bit;
    }

    /// Piece and color on a square, if any.
    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        let bit = bit_for_square(sq).0;
        if self.all_occupied.0 & bit == 0 {
            return None;
        }

        let color = if self.occupied[0].0 & bit != 0 {
            Color::White
        } else {
            Color::Black
        };
        for piece in Piece::ALL {
            if self.pieces[color.index()][piece.index()].0 & bit != 0 {
                return Some((color, piece));
            }
        }
        None
    }

    pub(crate) fn is_empty_square(&self, sq: Square) -> bool {
        self.all_occupied.0 & bit_for_square(sq).0 == 0
    }

    /// Recompute the Zobrist hash from scratch.
    ///
    /// `make_move` maintains the hash incrementally; this exists for
    /// initialization and for verifying the incremental updates in tests.
    #[must_use]
    pub fn calculate_hash(&self) -> u64 {
        let mut hash: u64 = 0;

        for color in Color::BOTH {
            for piece in Piece::ALL {
                for idx in self.pieces[color.index()][piece.index()].iter() {
                    hash ^= ZOBRIST.piece_keys[piece.index()][color.index()][idx.as_usize()];
                }
            }
        }

        if !self.white_to_move {
            hash ^= ZOBRIST.black_to_move_key;
        }

        hash ^= ZOBRIST.castling_keys[self.castling_rights as usize];

        if let Some(ep) = self.en_passant_target {
            hash ^= ZOBRIST.en_passant_keys[ep.file()];
        }

        hash
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}
