use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{GambitError, Result};

/// The two players in a chess game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    pub fn opponent(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }

    /// Single-letter code used in piece ids and status strings.
    pub fn code(self) -> char {
        match self {
            PieceColor::White => 'w',
            PieceColor::Black => 'b',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceColor::White => "White",
            PieceColor::Black => "Black",
        }
    }
}

impl Default for PieceColor {
    fn default() -> Self {
        PieceColor::White
    }
}

impl FromStr for PieceColor {
    type Err = GambitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "white" => Ok(PieceColor::White),
            "b" | "black" => Ok(PieceColor::Black),
            other => Err(GambitError::Configuration(format!(
                "unknown piece color '{other}'"
            ))),
        }
    }
}

/// Chess piece kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Material value used by the move evaluator.
    pub fn value(self) -> i32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight | PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King => 0,
        }
    }

    pub fn code(self) -> char {
        match self {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceKind::King => "king",
            PieceKind::Queen => "queen",
            PieceKind::Rook => "rook",
            PieceKind::Bishop => "bishop",
            PieceKind::Knight => "knight",
            PieceKind::Pawn => "pawn",
        }
    }
}

/// Board coordinate (0-indexed). File 0 is `a`, rank 0 is `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    pub file: u8,
    pub rank: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Self {
        Self { file, rank }
    }

    /// Builds a square from indices, rejecting anything off the board.
    pub fn try_new(file: i64, rank: i64) -> Option<Self> {
        let size = BoardState::SIZE as i64;
        if (0..size).contains(&file) && (0..size).contains(&rank) {
            Some(Square::new(file as u8, rank as u8))
        } else {
            None
        }
    }

    pub fn offset(&self, df: i8, dr: i8) -> Option<Square> {
        Square::try_new(
            self.file as i64 + df as i64,
            self.rank as i64 + dr as i64,
        )
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.file) as char
    }

    pub fn rank_char(&self) -> char {
        (b'1' + self.rank) as char
    }

    /// Every square, rank 1 first.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BoardState::SIZE)
            .flat_map(|rank| (0..BoardState::SIZE).map(move |file| Square::new(file, rank)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = GambitError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(GambitError::Rules(format!("invalid square '{s}'")));
        }
        let file = bytes[0].wrapping_sub(b'a') as i64;
        let rank = bytes[1].wrapping_sub(b'1') as i64;
        Square::try_new(file, rank).ok_or_else(|| GambitError::Rules(format!("invalid square '{s}'")))
    }
}

/// Piece with its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub color: PieceColor,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(color: PieceColor, kind: PieceKind) -> Self {
        Self { color, kind }
    }
}

/// 8x8 grid of optional pieces, indexed rank-major from `a1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub cells: Vec<Option<Piece>>,
}

impl BoardState {
    pub const SIZE: u8 = 8;

    pub fn empty() -> Self {
        Self {
            cells: vec![None; (Self::SIZE as usize) * (Self::SIZE as usize)],
        }
    }

    pub fn index(&self, square: Square) -> Option<usize> {
        if square.file < Self::SIZE && square.rank < Self::SIZE {
            Some((square.rank as usize) * (Self::SIZE as usize) + square.file as usize)
        } else {
            None
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.index(square)
            .and_then(|idx| self.cells.get(idx).copied().flatten())
    }

    pub fn set_piece(&mut self, square: Square, piece: Option<Piece>) -> bool {
        if let Some(idx) = self.index(square) {
            if let Some(slot) = self.cells.get_mut(idx) {
                *slot = piece;
                return true;
            }
        }
        false
    }

    /// Occupied squares in `a1..h8` order.
    pub fn occupied(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// Material total for one side.
    pub fn material(&self, color: PieceColor) -> i32 {
        self.occupied()
            .filter(|(_, piece)| piece.color == color)
            .map(|(_, piece)| piece.kind.value())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_bounds() {
        let board = BoardState::empty();
        assert!(board.index(Square::new(2, 3)).is_some());
        assert!(board.index(Square::new(8, 0)).is_none());
    }

    #[test]
    fn opponent_switch() {
        assert_eq!(PieceColor::White.opponent(), PieceColor::Black);
        assert_eq!(PieceColor::Black.opponent(), PieceColor::White);
    }

    #[test]
    fn square_algebraic_notation() {
        let square: Square = "e4".parse().expect("parse e4");
        assert_eq!(square, Square::new(4, 3));
        assert_eq!(square.to_string(), "e4");
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("".parse::<Square>().is_err());
        assert_eq!(Square::all().count(), 64);
    }

    #[test]
    fn material_counts_one_side() {
        let mut board = BoardState::empty();
        board.set_piece(
            Square::new(0, 0),
            Some(Piece::new(PieceColor::White, PieceKind::Queen)),
        );
        board.set_piece(
            Square::new(1, 0),
            Some(Piece::new(PieceColor::White, PieceKind::King)),
        );
        board.set_piece(
            Square::new(7, 7),
            Some(Piece::new(PieceColor::Black, PieceKind::Rook)),
        );
        assert_eq!(board.material(PieceColor::White), 9);
        assert_eq!(board.material(PieceColor::Black), 5);
        assert_eq!(board.occupied().count(), 3);
    }
}
