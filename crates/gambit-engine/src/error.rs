use gambit_types::GambitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no legal moves to choose from")]
    NoLegalMoves,
}

impl From<EngineError> for GambitError {
    fn from(err: EngineError) -> Self {
        GambitError::Engine(err.to_string())
    }
}
