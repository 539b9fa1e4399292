//! Opponent move selection, move scoring and commentary.

pub mod commentary;
pub mod evaluate;
pub mod random;
pub mod strategy;

mod error;

pub use commentary::Commentary;
pub use error::EngineError;
pub use random::{RandomSource, SequenceRandom, ThreadRandom};
pub use strategy::{select_move, Decision, Strategy, TurnContext};

/// Something that can play the computer's side.
pub trait Opponent: Send {
    fn choose(&mut self, ctx: &TurnContext<'_>) -> Result<Decision, EngineError>;

    fn set_strategy(&mut self, strategy: Strategy);

    /// Random source shared with the commentator so a single seed pins both.
    fn rng(&mut self) -> &mut dyn RandomSource;
}

/// Default opponent: a [`Strategy`] plus its random source.
pub struct StrategyOpponent {
    strategy: Strategy,
    rng: Box<dyn RandomSource>,
}

impl StrategyOpponent {
    pub fn new(strategy: Strategy) -> Self {
        Self::with_rng(strategy, Box::new(ThreadRandom::new()))
    }

    pub fn with_rng(strategy: Strategy, rng: Box<dyn RandomSource>) -> Self {
        Self { strategy, rng }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

impl Opponent for StrategyOpponent {
    fn choose(&mut self, ctx: &TurnContext<'_>) -> Result<Decision, EngineError> {
        select_move(self.strategy, ctx, self.rng.as_mut())
    }

    fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    fn rng(&mut self) -> &mut dyn RandomSource {
        self.rng.as_mut()
    }
}
