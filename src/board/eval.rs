//! Static evaluation: material plus mobility, in centipawns.

use super::movegen::MoveGenerator;
use super::state::Board;
use super::types::{Color, Piece};

/// Bonus per attacked square.
const MOBILITY_WEIGHT: i32 = 4;

fn material(board: &Board, color: Color) -> i32 {
    // kings cancel out and never leave the board
    [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
    ]
    .into_iter()
    .map(|piece| piece.value() * board.piece_board(color, piece).popcount() as i32)
    .sum()
}

/// Evaluate the position from the side to move's point of view.
///
/// Negamax expects the score to flip sign when the turn changes, so the
/// difference is taken white-minus-black and negated for black.
#[must_use]
pub fn evaluate(board: &Board, generator: &MoveGenerator<'_>) -> i32 {
    let material_balance = material(board, Color::White) - material(board, Color::Black);

    let white_attacks = generator.attack_map(board, Color::White).popcount() as i32;
    let black_attacks = generator.attack_map(board, Color::Black).popcount() as i32;
    let mobility = MOBILITY_WEIGHT * (white_attacks - black_attacks);

    let score = material_balance + mobility;
    match board.side_to_move() {
        Color::White => score,
        Color::Black => -score,
    }
}
