//! Move and position scoring.
//!
//! Material values come from [`gambit_types::board::PieceKind::value`]:
//!
//! | Piece  | Value |
//! |--------|-------|
//! | Pawn   | 1     |
//! | Knight | 3     |
//! | Bishop | 3     |
//! | Rook   | 5     |
//! | Queen  | 9     |
//! | King   | 0     |

use gambit_rules::{MoveInfo, Position};
use gambit_types::board::PieceColor;
use tracing::warn;

/// Multiplier applied to the captured piece's value.
pub const CAPTURE_WEIGHT: i32 = 10;
pub const CHECK_BONUS: i32 = 5;
pub const MATE_SCORE: i32 = 1000;
pub const STALEMATE_PENALTY: i32 = 50;

/// Greedy score of a single candidate move.
///
/// Moves that take nothing score 0. Captures earn
/// `CAPTURE_WEIGHT * value`, then the move is tried on a scratch copy of
/// `position` for the check, mate and stalemate adjustments.
pub fn score_move(mv: &MoveInfo, position: &Position) -> i32 {
    let Some(captured) = mv.captured else {
        return 0;
    };

    let mut score = 0;
    if mv.flags.capture {
        score += captured.value() * CAPTURE_WEIGHT;
    }

    let after = match position.play(mv) {
        Ok(after) => after,
        Err(err) => {
            warn!(%err, san = %mv.san, "scoring a move that does not apply");
            return score;
        }
    };

    if after.is_check() {
        score += CHECK_BONUS;
    }
    if after.is_checkmate() {
        score += MATE_SCORE;
    }
    if after.is_stalemate() {
        score -= STALEMATE_PENALTY;
    }
    score
}

/// Leaf evaluation. Positive scores favour the side that is *not*
/// `perspective`.
pub fn score_static_position(position: &Position, perspective: PieceColor) -> i32 {
    if position.is_checkmate() {
        return if position.turn() == perspective {
            -MATE_SCORE
        } else {
            MATE_SCORE
        };
    }
    if position.is_stalemate() || position.is_draw() {
        return 0;
    }

    let board = position.board();
    board.material(perspective.opponent()) - board.material(perspective)
}

/// Plain fixed-depth negamax, no pruning. Interior nodes without legal moves
/// score 0 whether they are mate or stalemate.
pub fn search_best_score(position: &Position, depth: u8, perspective: PieceColor) -> i32 {
    let mut nodes = 0;
    negamax(position, depth, perspective, &mut nodes)
}

/// Same as [`search_best_score`], also counting visited nodes.
pub(crate) fn negamax(
    position: &Position,
    depth: u8,
    perspective: PieceColor,
    nodes: &mut u64,
) -> i32 {
    *nodes += 1;
    if depth == 0 {
        return score_static_position(position, perspective);
    }

    let children = position.successors();
    if children.is_empty() {
        return 0;
    }

    children
        .iter()
        .map(|child| -negamax(child, depth - 1, perspective, nodes))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_rules::MoveRequest;

    fn position(fen: &str) -> Position {
        Position::from_fen(fen).expect("valid fen")
    }

    fn find(position: &Position, from: &str, to: &str) -> MoveInfo {
        position
            .find_move(&MoveRequest::new(
                from.parse().expect("from"),
                to.parse().expect("to"),
            ))
            .expect("legal move")
    }

    #[test]
    fn quiet_moves_score_zero() {
        let start = Position::initial();
        for mv in start.legal_moves() {
            assert_eq!(score_move(&mv, &start), 0);
        }
    }

    #[test]
    fn quiet_check_scores_zero() {
        // Bb5+ gives check but takes nothing.
        let pos = position("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
        let check = find(&pos, "f1", "b5");
        assert!(check.san.ends_with('+'));
        assert_eq!(score_move(&check, &pos), 0);
    }

    #[test]
    fn queen_capture_outscores_pawn_capture() {
        // Nxd5 takes the queen, exf5 takes a pawn; neither gives check.
        let pos = position("4k3/8/8/3q1p2/4P3/2N5/8/4K3 w - - 0 1");
        let takes_queen = find(&pos, "c3", "d5");
        let takes_pawn = find(&pos, "e4", "f5");
        assert!(!takes_queen.san.contains('+'));
        assert!(!takes_pawn.san.contains('+'));
        let queen_score = score_move(&takes_queen, &pos);
        let pawn_score = score_move(&takes_pawn, &pos);
        assert_eq!(queen_score, 90);
        assert_eq!(pawn_score, 10);
        assert!(queen_score - pawn_score >= 80);
    }

    #[test]
    fn capture_with_check_and_mate_bonuses() {
        // Qxf7# in the scholar's mate pattern.
        let pos = position("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4");
        let mate = find(&pos, "h5", "f7");
        assert_eq!(mate.san, "Qxf7#");
        assert_eq!(score_move(&mate, &pos), 10 + CHECK_BONUS + MATE_SCORE);
    }

    #[test]
    fn stalemating_capture_is_penalised() {
        // Qxg6 takes the last black pawn and leaves the king on h8 stalemated.
        let pos = position("7k/8/6pK/8/8/8/8/6Q1 w - - 0 1");
        let stalemate = find(&pos, "g1", "g6");
        assert_eq!(score_move(&stalemate, &pos), 10 - STALEMATE_PENALTY);
    }

    #[test]
    fn static_score_counts_material_against_perspective() {
        // White is a rook up.
        let pos = position("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        assert_eq!(score_static_position(&pos, PieceColor::Black), 5);
        assert_eq!(score_static_position(&pos, PieceColor::White), -5);
        assert_eq!(score_static_position(&Position::initial(), PieceColor::White), 0);
    }

    #[test]
    fn static_score_mate_sign_and_draws() {
        // White to move and mated.
        let mated = position("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(mated.is_checkmate());
        assert_eq!(score_static_position(&mated, PieceColor::White), -MATE_SCORE);
        assert_eq!(score_static_position(&mated, PieceColor::Black), MATE_SCORE);

        let stalemate = position("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert_eq!(score_static_position(&stalemate, PieceColor::White), 0);
    }

    #[test]
    fn interior_nodes_without_moves_are_neutral() {
        let mated = position("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(search_best_score(&mated, 1, PieceColor::White), 0);
        assert_eq!(search_best_score(&mated, 0, PieceColor::White), -MATE_SCORE);
    }

    #[test]
    fn depth_one_search_sees_free_material() {
        // Black to move can take the hanging queen on d1 with the rook.
        let pos = position("3rk3/8/8/8/8/8/8/3QK3 b - - 0 1");
        // From black's perspective the best child is Rxd1: 5 - 0.
        assert_eq!(search_best_score(&pos, 1, PieceColor::Black), 5);
        let mut nodes = 0;
        negamax(&pos, 1, PieceColor::Black, &mut nodes);
        assert_eq!(nodes as usize, pos.successors().len() + 1);
    }
}
