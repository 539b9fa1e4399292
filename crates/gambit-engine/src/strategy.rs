//! Skill-tiered opponent move selection.

use std::time::Instant;

use gambit_rules::{MoveInfo, Position};
use gambit_types::{board::PieceColor, telemetry::SearchMetrics, time_control::SkillLevel};
use tracing::debug;

use crate::{
    evaluate::{negamax, score_move},
    random::RandomSource,
    EngineError,
};

/// Chance the beginner ignores its preferences entirely.
const BEGINNER_BLUNDER_RATE: f64 = 0.3;
const BEGINNER_CAPTURE_RATE: f64 = 0.7;
const BEGINNER_CHECK_RATE: f64 = 0.6;
/// Chance the intermediate tier settles for one of its top picks.
const INTERMEDIATE_SLIP_RATE: f64 = 0.2;
const INTERMEDIATE_SLIP_WINDOW: usize = 3;
/// Plies searched by the advanced tier, root move included.
pub const ADVANCED_DEPTH: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Weighted random: prefers captures, then checks.
    Beginner,
    /// Greedy on [`score_move`] with an occasional slip.
    Intermediate,
    /// Depth-2 negamax on material.
    Advanced,
    /// Uniform over all legal moves.
    Random,
}

impl Strategy {
    /// Maps a tier name; anything unrecognised plays uniformly at random.
    pub fn from_name(name: &str) -> Self {
        name.parse::<SkillLevel>()
            .map(Strategy::from)
            .unwrap_or(Strategy::Random)
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Beginner => "beginner",
            Strategy::Intermediate => "intermediate",
            Strategy::Advanced => "advanced",
            Strategy::Random => "random",
        }
    }
}

impl From<SkillLevel> for Strategy {
    fn from(level: SkillLevel) -> Self {
        match level {
            SkillLevel::Beginner => Strategy::Beginner,
            SkillLevel::Intermediate => Strategy::Intermediate,
            SkillLevel::Advanced => Strategy::Advanced,
        }
    }
}

/// Everything a strategy needs to choose for the side to move.
pub struct TurnContext<'a> {
    pub position: &'a Position,
    pub moves: &'a [MoveInfo],
    /// The human's colour; the advanced search evaluates from it.
    pub user_color: PieceColor,
}

#[derive(Debug, Clone)]
pub struct Decision {
    pub chosen: MoveInfo,
    pub score: Option<i32>,
    pub metrics: SearchMetrics,
}

/// Picks one move from `ctx.moves`. Fails only when there are none.
pub fn select_move(
    strategy: Strategy,
    ctx: &TurnContext<'_>,
    rng: &mut dyn RandomSource,
) -> Result<Decision, EngineError> {
    if ctx.moves.is_empty() {
        return Err(EngineError::NoLegalMoves);
    }

    let started = Instant::now();
    let mut nodes = 0;
    let (chosen, score) = match strategy {
        Strategy::Beginner => (pick_beginner(ctx, rng), None),
        Strategy::Intermediate => {
            let (mv, score) = pick_intermediate(ctx, rng);
            (mv, Some(score))
        }
        Strategy::Advanced => {
            let (mv, score) = pick_advanced(ctx, &mut nodes);
            (mv, Some(score))
        }
        Strategy::Random => (pick_uniform(ctx.moves, rng), None),
    };

    let metrics = SearchMetrics {
        strategy: strategy.name().to_string(),
        candidates: ctx.moves.len(),
        nodes,
        duration_ms: started.elapsed().as_millis() as u64,
    };
    debug!(
        strategy = strategy.name(),
        san = %chosen.san,
        ?score,
        nodes,
        "opponent move selected"
    );

    Ok(Decision {
        chosen: chosen.clone(),
        score,
        metrics,
    })
}

fn pick_uniform<'m>(moves: &'m [MoveInfo], rng: &mut dyn RandomSource) -> &'m MoveInfo {
    &moves[rng.pick_index(moves.len())]
}

fn pick_beginner<'m>(ctx: &TurnContext<'m>, rng: &mut dyn RandomSource) -> &'m MoveInfo {
    if rng.next_f64() < BEGINNER_BLUNDER_RATE {
        return pick_uniform(ctx.moves, rng);
    }

    let captures: Vec<&MoveInfo> = ctx.moves.iter().filter(|mv| mv.flags.capture).collect();
    let checks: Vec<&MoveInfo> = ctx
        .moves
        .iter()
        .filter(|mv| {
            ctx.position
                .play(mv)
                .map(|after| after.is_check())
                .unwrap_or(false)
        })
        .collect();

    if !captures.is_empty() && rng.next_f64() < BEGINNER_CAPTURE_RATE {
        captures[rng.pick_index(captures.len())]
    } else if !checks.is_empty() && rng.next_f64() < BEGINNER_CHECK_RATE {
        checks[rng.pick_index(checks.len())]
    } else {
        pick_uniform(ctx.moves, rng)
    }
}

fn pick_intermediate<'m>(
    ctx: &TurnContext<'m>,
    rng: &mut dyn RandomSource,
) -> (&'m MoveInfo, i32) {
    let mut scored: Vec<(&MoveInfo, i32)> = ctx
        .moves
        .iter()
        .map(|mv| (mv, score_move(mv, ctx.position)))
        .collect();
    // Stable: equal scores keep move-list order.
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    if rng.next_f64() < INTERMEDIATE_SLIP_RATE {
        let window = scored.len().min(INTERMEDIATE_SLIP_WINDOW);
        scored[rng.pick_index(window)]
    } else {
        scored[0]
    }
}

fn pick_advanced<'m>(ctx: &TurnContext<'m>, nodes: &mut u64) -> (&'m MoveInfo, i32) {
    let mut best_move = &ctx.moves[0];
    let mut best_score = i32::MIN;

    for mv in ctx.moves {
        let Ok(child) = ctx.position.play(mv) else {
            continue;
        };
        let score = -negamax(&child, ADVANCED_DEPTH - 1, ctx.user_color, nodes);
        if score > best_score {
            best_score = score;
            best_move = mv;
        }
    }

    (best_move, best_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{SequenceRandom, ThreadRandom};
    use gambit_rules::{Game, MoveRequest};

    fn position(fen: &str) -> Position {
        Position::from_fen(fen).expect("valid fen")
    }

    fn choose(
        strategy: Strategy,
        position: &Position,
        user_color: PieceColor,
        rng: &mut dyn RandomSource,
    ) -> Decision {
        let moves = position.legal_moves();
        let ctx = TurnContext {
            position,
            moves: &moves,
            user_color,
        };
        select_move(strategy, &ctx, rng).expect("decision")
    }

    #[test]
    fn empty_move_list_is_an_error() {
        let stalemate = position("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        let moves = stalemate.legal_moves();
        let ctx = TurnContext {
            position: &stalemate,
            moves: &moves,
            user_color: PieceColor::White,
        };
        let mut rng = SequenceRandom::constant(0.5);
        for strategy in [
            Strategy::Beginner,
            Strategy::Intermediate,
            Strategy::Advanced,
            Strategy::Random,
        ] {
            assert!(matches!(
                select_move(strategy, &ctx, &mut rng),
                Err(EngineError::NoLegalMoves)
            ));
        }
    }

    #[test]
    fn every_tier_returns_a_legal_move() {
        let fens = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
            "4k3/8/8/3q1p2/4P3/2N5/8/4K3 b - - 0 1",
            "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
        ];
        let mut rng = ThreadRandom::seeded(42);
        for fen in fens {
            let pos = position(fen);
            let legal = pos.legal_moves();
            for strategy in [
                Strategy::Beginner,
                Strategy::Intermediate,
                Strategy::Advanced,
                Strategy::Random,
            ] {
                let trials = if strategy == Strategy::Advanced { 1 } else { 25 };
                for _ in 0..trials {
                    let decision = choose(strategy, &pos, PieceColor::Black, &mut rng);
                    assert!(legal.contains(&decision.chosen), "{fen} {strategy:?}");
                }
            }
        }
    }

    #[test]
    fn beginner_blunder_roll_picks_uniformly() {
        let pos = Position::initial();
        let moves = pos.legal_moves();
        // 0.1 < 0.3 triggers the uniform pick; 0.0 selects the first move.
        let mut rng = SequenceRandom::new(vec![0.1, 0.0]);
        let decision = choose(Strategy::Beginner, &pos, PieceColor::Black, &mut rng);
        assert_eq!(decision.chosen, moves[0]);
    }

    #[test]
    fn beginner_prefers_captures() {
        let pos = position("4k3/8/8/3q1p2/4P3/2N5/8/4K3 w - - 0 1");
        // Skip the blunder roll, accept the capture roll, take the last capture.
        let mut rng = SequenceRandom::new(vec![0.5, 0.1, 0.99]);
        let decision = choose(Strategy::Beginner, &pos, PieceColor::Black, &mut rng);
        assert!(decision.chosen.flags.capture);
    }

    #[test]
    fn beginner_falls_back_to_checks() {
        // No captures available; Bb5+ is the only checking move.
        let pos = position("rnbqkbnr/ppp1pppp/8/3p4/8/4P3/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
        let mut rng = SequenceRandom::new(vec![0.5, 0.1, 0.0]);
        let decision = choose(Strategy::Beginner, &pos, PieceColor::Black, &mut rng);
        assert_eq!(decision.chosen.san, "Bb5+");
    }

    #[test]
    fn intermediate_takes_the_top_score() {
        let pos = position("4k3/8/8/3q1p2/4P3/2N5/8/4K3 w - - 0 1");
        let mut rng = SequenceRandom::constant(0.9);
        let decision = choose(Strategy::Intermediate, &pos, PieceColor::Black, &mut rng);
        assert_eq!(decision.chosen.to, "d5".parse().expect("d5"));
        assert_eq!(decision.score, Some(90));
    }

    #[test]
    fn intermediate_slip_stays_in_top_three() {
        let pos = position("4k3/8/8/3q1p2/4P3/2N5/8/4K3 w - - 0 1");
        let moves = pos.legal_moves();
        let mut scores: Vec<i32> = moves.iter().map(|mv| score_move(mv, &pos)).collect();
        scores.sort_unstable_by(|a, b| b.cmp(a));
        let third_best = scores[2];

        let mut rng = SequenceRandom::new(vec![0.1, 0.99]);
        let decision = choose(Strategy::Intermediate, &pos, PieceColor::Black, &mut rng);
        assert!(decision.score.expect("scored") >= third_best);
    }

    #[test]
    fn intermediate_ties_keep_list_order() {
        let pos = Position::initial();
        let moves = pos.legal_moves();
        let mut rng = SequenceRandom::constant(0.9);
        let decision = choose(Strategy::Intermediate, &pos, PieceColor::Black, &mut rng);
        assert_eq!(decision.chosen, moves[0]);
    }

    #[test]
    fn advanced_wins_free_material() {
        // Black (computer) can win the white queen; the user plays white.
        let pos = position("3rk3/8/8/8/8/8/8/3QK3 b - - 0 1");
        let mut rng = SequenceRandom::constant(0.0);
        let decision = choose(Strategy::Advanced, &pos, PieceColor::White, &mut rng);
        assert_eq!(decision.chosen.san, "Rxd1+");
        assert!(decision.metrics.nodes > 0);
    }

    #[test]
    fn advanced_keeps_first_move_on_ties() {
        let mut game = Game::new();
        game.apply(MoveRequest::new(
            "e2".parse().expect("e2"),
            "e4".parse().expect("e4"),
        ))
        .expect("e4");
        let pos = game.snapshot();
        let moves = pos.legal_moves();
        let mut rng = SequenceRandom::constant(0.0);
        let decision = choose(Strategy::Advanced, &pos, PieceColor::White, &mut rng);
        // Many replies tie at the best score; the earliest one wins.
        let first_best = moves
            .iter()
            .find(|mv| {
                let child = pos.play(mv).expect("child");
                -crate::evaluate::search_best_score(&child, 1, PieceColor::White)
                    == decision.score.expect("scored")
            })
            .expect("best exists");
        assert_eq!(&decision.chosen, first_best);
    }

    #[test]
    fn unknown_names_play_randomly() {
        assert_eq!(Strategy::from_name("advanced"), Strategy::Advanced);
        assert_eq!(Strategy::from_name("Beginner"), Strategy::Beginner);
        assert_eq!(Strategy::from_name("grandmaster"), Strategy::Random);
    }
}
