//! Negamax alpha-beta recursion.

use crate::board::types::Move;
use crate::board::{eval, Board};
use crate::tt::BoundType;

use super::ordering::order_moves;
use super::{from_tt_score, to_tt_score, Lane, DRAW_SCORE, INFINITY, MATE_SCORE};

/// Score returned by one node.
///
/// `repetition` marks a value that depends on the path taken to reach the
/// node. The parent that receives it skips its table store and clears the
/// flag, so path-dependent draws never poison the shared table.
pub(crate) struct NodeValue {
    pub(crate) score: i32,
    pub(crate) repetition: bool,
}

impl NodeValue {
    fn settled(score: i32) -> Self {
        NodeValue {
            score,
            repetition: false,
        }
    }

    fn draw_by_repetition() -> Self {
        NodeValue {
            score: DRAW_SCORE,
            repetition: true,
        }
    }
}

impl Lane<'_> {
    /// One root iteration at a fixed depth. Returns the best move with its
    /// score, or `None` when the side to move has no legal moves or the
    /// iteration was cancelled before finishing the first child.
    pub(crate) fn search_root(&mut self, board: &mut Board, depth: u32) -> Option<(Move, i32)> {
        let generated = self.generator.generate(board);
        if generated.moves.is_empty() {
            return None;
        }

        let pv_move = self.tt.probe(board.hash()).and_then(|entry| entry.best_move);
        let ordered = order_moves(
            &generated,
            board.side_to_move().index(),
            pv_move,
            &self.history,
            0,
            &mut self.jitter,
        );

        let mut alpha = -INFINITY;
        let beta = INFINITY;
        let mut best: Option<(Move, i32)> = None;

        for mv in ordered {
            let info = board.make_move(mv);
            self.repetitions.push(board.hash());
            let child = self.alphabeta(board, depth - 1, 1, -beta, -alpha);
            self.repetitions.pop(board.hash());
            board.unmake_move(mv, info);

            if self.aborted {
                return best;
            }

            let score = -child.score;
            if best.is_none() || score > alpha {
                best = Some((mv, score));
                alpha = alpha.max(score);
            }
        }

        if let Some((mv, score)) = best {
            self.tt
                .store(board.hash(), depth, score, BoundType::Exact, Some(mv));
            return Some((mv, score));
        }
        best
    }

    pub(crate) fn alphabeta(
        &mut self,
        board: &mut Board,
        depth: u32,
        ply: u32,
        mut alpha: i32,
        mut beta: i32,
    ) -> NodeValue {
        if self.should_stop() {
            self.aborted = true;
            return NodeValue::settled(alpha);
        }
        self.nodes += 1;

        let original_alpha = alpha;
        let original_beta = beta;
        let hash = board.hash();

        let mut pv_move = None;
        if let Some(entry) = self.tt.probe(hash) {
            pv_move = entry.best_move;
            if entry.depth as u32 >= depth && !self.pv_move_repeats(board, entry.best_move) {
                let score = from_tt_score(entry.score as i32, ply);
                match entry.bound_type {
                    BoundType::Exact => return NodeValue::settled(score),
                    BoundType::LowerBound => {
                        if score >= beta {
                            return NodeValue::settled(score);
                        }
                        alpha = alpha.max(score);
                    }
                    BoundType::UpperBound => {
                        if score <= alpha {
                            return NodeValue::settled(score);
                        }
                        beta = beta.min(score);
                    }
                }
                if alpha >= beta {
                    return NodeValue::settled(score);
                }
            }
        }

        if self.repetitions.count(hash) >= 3 {
            return NodeValue::draw_by_repetition();
        }

        if depth == 0 {
            return NodeValue::settled(eval::evaluate(board, &self.generator));
        }

        let generated = self.generator.generate(board);
        if generated.moves.is_empty() {
            let score = if generated.in_check {
                -(MATE_SCORE - ply as i32)
            } else {
                DRAW_SCORE
            };
            return NodeValue::settled(score);
        }

        let ordered = order_moves(
            &generated,
            board.side_to_move().index(),
            pv_move,
            &self.history,
            ply,
            &mut self.jitter,
        );

        let mut best_score = -INFINITY;
        let mut best_move = Move::null();
        let mut path_dependent = false;

        for mv in ordered {
            let info = board.make_move(mv);
            self.repetitions.push(board.hash());
            let child = self.alphabeta(board, depth - 1, ply + 1, -beta, -alpha);
            self.repetitions.pop(board.hash());
            board.unmake_move(mv, info);

            if self.aborted {
                return NodeValue::settled(best_score.max(original_alpha));
            }

            let score = -child.score;
            if score > best_score {
                best_score = score;
                best_move = mv;
                path_dependent = child.repetition;
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                if mv.is_quiet() {
                    self.history.update(mv, depth);
                }
                break;
            }
        }

        if !path_dependent {
            let bound = if best_score <= original_alpha {
                BoundType::UpperBound
            } else if best_score >= original_beta {
                BoundType::LowerBound
            } else {
                BoundType::Exact
            };
            self.tt.store(
                hash,
                depth,
                to_tt_score(best_score, ply),
                bound,
                Some(best_move),
            );
        }

        NodeValue::settled(best_score)
    }

    /// A cached best move that immediately repeats the position makes the
    /// stored score unreliable for this path, so the entry is only used for
    /// ordering.
    fn pv_move_repeats(&mut self, board: &mut Board, pv_move: Option<Move>) -> bool {
        let Some(mv) = pv_move else {
            return false;
        };
        let generated = self.generator.generate(board);
        if !generated.moves.contains(mv) {
            return true;
        }
        let info = board.make_move(mv);
        let repeats = self.repetitions.count(board.hash()) + 1 >= 2;
        board.unmake_move(mv, info);
        repeats
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use super::*;
    use crate::board::test_util::tables;
    use crate::board::RepetitionTracker;
    use crate::tt::TranspositionTable;

    fn lane<'a>(
        tt: &'a TranspositionTable,
        stop: &'a AtomicBool,
    ) -> Lane<'a> {
        Lane::new(tables(), tt, stop, None, RepetitionTracker::new(), None)
    }

    fn best_move(fen: &str, depth: u32) -> Option<(Move, i32)> {
        let tt = TranspositionTable::new(16);
        let stop = AtomicBool::new(false);
        let mut lane = lane(&tt, &stop);
        let mut board = Board::try_from_fen(fen).expect("valid test position");
        lane.repetitions.push(board.hash());
        lane.search_root(&mut board, depth)
    }

    #[test]
    fn finds_mate_in_one() {
        // Ra8 is mate against the cornered king
        let result = best_move("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1", 3);
        let (mv, score) = result.expect("moves available");
        assert_eq!(mv.to(), "a8".parse().unwrap());
        assert_eq!(score, MATE_SCORE - 1);
    }

    #[test]
    fn prefers_capturing_a_hanging_queen() {
        let result = best_move("7k/8/8/3q4/2P5/8/8/K7 w - - 0 1", 4);
        let (mv, _) = result.expect("moves available");
        assert!(mv.is_capture());
        assert_eq!(mv.to(), "d5".parse().unwrap());
    }

    #[test]
    fn checkmated_root_has_no_move() {
        let result = best_move("3R2k1/5ppp/8/8/8/8/8/4K3 b - - 0 1", 3);
        assert!(result.is_none());
    }

    #[test]
    fn stalemate_root_has_no_move() {
        let result = best_move("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 3);
        assert!(result.is_none());
    }

    #[test]
    fn winning_side_does_not_stalemate() {
        // Qf7 here would stalemate the cornered king and throw the win away
        let fen = "7k/8/4Q3/8/8/8/8/K7 w - - 0 1";
        let result = best_move(fen, 4);
        let (mv, score) = result.expect("moves available");
        assert!(score > 0);

        let mut board = Board::try_from_fen(fen).expect("valid");
        board.make_move(mv);
        let generator = crate::board::MoveGenerator::new(tables());
        assert!(!generator.generate(&board).is_stalemate());
    }

    #[test]
    fn threefold_repetition_scores_as_draw() {
        let fen = "7k/8/8/8/8/8/8/K7 w - - 0 1";
        let tt = TranspositionTable::new(16);
        let stop = AtomicBool::new(false);
        let mut lane = lane(&tt, &stop);
        let mut board = Board::try_from_fen(fen).expect("valid");
        // seed the tracker so the current position already occurred 3 times
        lane.repetitions.push(board.hash());
        lane.repetitions.push(board.hash());
        lane.repetitions.push(board.hash());
        let value = lane.alphabeta(&mut board, 4, 0, -INFINITY, INFINITY);
        assert_eq!(value.score, DRAW_SCORE);
        assert!(value.repetition);
        // the path-dependent draw must not have been persisted
        assert!(tt.probe(board.hash()).is_none());
    }

    #[test]
    fn shallow_table_entry_is_not_trusted_at_greater_depth() {
        let fen = "6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1";
        let tt = TranspositionTable::new(16);
        let stop = AtomicBool::new(false);
        let mut lane = lane(&tt, &stop);
        let mut board = Board::try_from_fen(fen).expect("valid");
        lane.repetitions.push(board.hash());

        // plant a depth-1 exact score claiming the position is level
        let quiet = Move::quiet(
            "a1".parse().unwrap(),
            "a2".parse().unwrap(),
            crate::board::types::Piece::Rook,
        );
        tt.store(board.hash(), 1, 0, BoundType::Exact, Some(quiet));

        // at its own depth the entry answers outright
        let shallow = lane.alphabeta(&mut board, 1, 0, -INFINITY, INFINITY);
        assert_eq!(shallow.score, 0);

        // a deeper visit must search past it and find the mate
        let deep = lane.alphabeta(&mut board, 3, 0, -INFINITY, INFINITY);
        assert_eq!(deep.score, MATE_SCORE - 1);
    }

    #[test]
    fn deeper_search_still_finds_the_mate_through_the_table() {
        let fen = "6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1";
        let tt = TranspositionTable::new(16);
        let stop = AtomicBool::new(false);
        let mut lane = lane(&tt, &stop);
        let mut board = Board::try_from_fen(fen).expect("valid");
        lane.repetitions.push(board.hash());
        for depth in 1..=4 {
            let result = lane.search_root(&mut board, depth);
            let (mv, _) = result.expect("moves available");
            if depth >= 2 {
                assert_eq!(mv.to(), "a8".parse().unwrap(), "depth {depth}");
            }
        }
    }
}
