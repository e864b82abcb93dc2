//! Move ordering.

use rand::rngs::StdRng;
use rand::Rng;

use crate::board::types::{Bitboard, Move, Piece};
use crate::board::GeneratedMoves;

use super::HistoryTable;

/// Principal-variation move score, above everything else.
const PV_SCORE: i32 = 1 << 20;
/// Base score for captures and promotions that do not lose material outright.
const TACTICAL_SCORE: i32 = 100_000;

/// Helper lanes perturb quiet-move order this close to the root.
const JITTER_PLY_LIMIT: u32 = 2;
const JITTER_RANGE: i32 = 50;

fn material_swing(mv: Move) -> i32 {
    let mut swing = 0;
    if let Some(victim) = mv.captured() {
        swing += victim.value() - mv.piece().value();
    }
    if let Some(promo) = mv.promotion_piece() {
        swing += promo.value() - Piece::Pawn.value();
    }
    swing
}

fn score_move(
    mv: Move,
    pv_move: Option<Move>,
    enemy_attacks: Bitboard,
    history: &HistoryTable,
    ply: u32,
    jitter: &mut Option<StdRng>,
) -> i32 {
    if pv_move == Some(mv) {
        return PV_SCORE;
    }

    if mv.is_capture() || mv.is_promotion() {
        let swing = material_swing(mv);
        // a losing capture onto a defended square goes below the quiets
        if swing < 0 && enemy_attacks.contains(mv.to()) {
            return -TACTICAL_SCORE + swing;
        }
        return TACTICAL_SCORE + swing;
    }

    let mut score = history.score(mv);
    if ply < JITTER_PLY_LIMIT {
        if let Some(rng) = jitter {
            score += rng.gen_range(0..JITTER_RANGE);
        }
    }
    score
}

/// Order the legal moves: PV move first, then winning/even tactics by
/// material swing, then quiets by history, then losing tactics. The sort is
/// stable, so equally scored moves keep their generation order.
pub(crate) fn order_moves(
    generated: &GeneratedMoves,
    side_index: usize,
    pv_move: Option<Move>,
    history: &HistoryTable,
    ply: u32,
    jitter: &mut Option<StdRng>,
) -> Vec<Move> {
    let enemy_attacks = generated.attacked[1 - side_index];
    let mut scored: Vec<(i32, Move)> = generated
        .moves
        .iter()
        .map(|&mv| {
            (
                score_move(mv, pv_move, enemy_attacks, history, ply, jitter),
                mv,
            )
        })
        .collect();
    scored.sort_by_key(|(score, _)| std::cmp::Reverse(*score));
    scored.into_iter().map(|(_, mv)| mv).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::test_util::tables;
    use crate::board::{Board, MoveGenerator};

    fn order_for(fen: &str, pv_move: Option<Move>) -> Vec<Move> {
        let board = Board::try_from_fen(fen).expect("valid test position");
        let generated = MoveGenerator::new(tables()).generate(&board);
        let history = HistoryTable::new();
        order_moves(
            &generated,
            board.side_to_move().index(),
            pv_move,
            &history,
            0,
            &mut None,
        )
    }

    #[test]
    fn pv_move_comes_first() {
        let board = Board::new();
        let generated = MoveGenerator::new(tables()).generate(&board);
        let pv = generated.moves.as_slice()[7];
        let ordered = order_moves(
            &generated,
            0,
            Some(pv),
            &HistoryTable::new(),
            0,
            &mut None,
        );
        assert_eq!(ordered[0].as_u32(), pv.as_u32());
    }

    #[test]
    fn winning_capture_precedes_quiets() {
        // queen hangs on d5; pawn takes first
        let ordered = order_for("7k/8/8/3q4/2P5/8/8/K7 w - - 0 1", None);
        assert!(ordered[0].is_capture());
        assert_eq!(ordered[0].to(), "d5".parse().unwrap());
    }

    #[test]
    fn losing_capture_on_a_defended_square_drops_below_quiets() {
        // the d5 pawn is defended by the e6 pawn; Qxd5 loses the queen
        let ordered = order_for("7k/8/4p3/3p4/8/3Q4/8/K7 w - - 0 1", None);
        let qxd5 = ordered
            .iter()
            .position(|mv| mv.is_capture() && mv.to() == "d5".parse().unwrap())
            .expect("capture generated");
        let first_quiet = ordered
            .iter()
            .position(|mv| mv.is_quiet())
            .expect("quiet moves exist");
        assert!(qxd5 > first_quiet);
    }

    #[test]
    fn history_reorders_quiets() {
        let board = Board::new();
        let generated = MoveGenerator::new(tables()).generate(&board);
        let favored = generated.moves.as_slice()[11];
        let mut history = HistoryTable::new();
        history.update(favored, 6);
        let ordered = order_moves(&generated, 0, None, &history, 0, &mut None);
        assert_eq!(ordered[0].as_u32(), favored.as_u32());
    }
}
