use gambit_types::{board::Square, GambitError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },
    #[error("illegal move {from}->{to}")]
    IllegalMove { from: Square, to: Square },
}

impl From<RulesError> for GambitError {
    fn from(err: RulesError) -> Self {
        GambitError::Rules(err.to_string())
    }
}
