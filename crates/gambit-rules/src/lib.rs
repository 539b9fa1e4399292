//! Chess rules adapter. Wraps `shakmaty` behind the move/position contract
//! the session and the opponent engine consume.

mod convert;
mod error;
mod game;
mod position;

pub use error::RulesError;
pub use game::Game;
pub use position::{MoveFlags, MoveInfo, MoveRequest, Position};

/// Standard starting position in FEN.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
