use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    board::{PieceColor, Square},
    geometry::{BoardPiece, BoardSquare, Point3},
    time_control::SkillLevel,
};

/// Session status. Displayed as `idle`, `ongoing`, `paused`,
/// `checkmate-<winner>`, `draw`, `stalemate` or `timeout-<loser>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Idle,
    Ongoing,
    Paused,
    Checkmate(PieceColor),
    Draw,
    Stalemate,
    Timeout(PieceColor),
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GameStatus::Checkmate(_)
                | GameStatus::Draw
                | GameStatus::Stalemate
                | GameStatus::Timeout(_)
        )
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        GameStatus::Idle
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Idle => f.write_str("idle"),
            GameStatus::Ongoing => f.write_str("ongoing"),
            GameStatus::Paused => f.write_str("paused"),
            GameStatus::Checkmate(winner) => write!(f, "checkmate-{}", winner.code()),
            GameStatus::Draw => f.write_str("draw"),
            GameStatus::Stalemate => f.write_str("stalemate"),
            GameStatus::Timeout(color) => write!(f, "timeout-{}", color.code()),
        }
    }
}

/// Remaining seconds per side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GameClocks {
    pub white_secs: u32,
    pub black_secs: u32,
}

impl GameClocks {
    pub fn uniform(secs: u32) -> Self {
        Self {
            white_secs: secs,
            black_secs: secs,
        }
    }

    /// Removes one second from `color`, returning what is left.
    pub fn decrement(&mut self, color: PieceColor) -> u32 {
        let slot = match color {
            PieceColor::White => &mut self.white_secs,
            PieceColor::Black => &mut self.black_secs,
        };
        *slot = slot.saturating_sub(1);
        *slot
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LastMove {
    pub from: Square,
    pub to: Square,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mover {
    User,
    Computer,
}

/// Everything the renderer needs to draw one frame of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub status: GameStatus,
    pub user_color: PieceColor,
    pub skill_level: SkillLevel,
    pub side_to_move: PieceColor,
    pub in_check: bool,
    pub clocks: GameClocks,
    pub pieces: Vec<BoardPiece>,
    pub squares: Vec<BoardSquare>,
    pub selected_square: Option<Square>,
    pub possible_moves: Vec<Square>,
    pub highlight: Option<Point3>,
    pub last_move: Option<LastMove>,
    pub commentary: String,
    pub move_history: Vec<String>,
    pub history_index: i32,
    pub fen: String,
    pub created_at: DateTime<Utc>,
}
