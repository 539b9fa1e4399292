//! Mapping between algebraic squares and the renderer's board-space
//! coordinates. The board lies in the `y = 0` plane, centred on the origin,
//! with files along `x` and ranks along `z`.

use serde::{Deserialize, Serialize};

use crate::board::{BoardState, PieceColor, PieceKind, Square};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Centre of `square` in board space.
pub fn square_to_position(square: Square, square_size: f32, half_size: f32) -> Point3 {
    let x = (square.file as f32 * square_size) - half_size + square_size / 2.0;
    let z = (square.rank as f32 * square_size) - half_size + square_size / 2.0;
    Point3::new(x, 0.0, z)
}

/// Square under the board-space point `(x, z)`, or `None` off the board.
pub fn position_to_square(x: f32, z: f32, square_size: f32, half_size: f32) -> Option<Square> {
    let file = ((x + half_size) / square_size).floor();
    let rank = ((z + half_size) / square_size).floor();
    if !file.is_finite() || !rank.is_finite() {
        return None;
    }
    Square::try_new(file as i64, rank as i64)
}

/// Static cell of the drawn board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSquare {
    pub id: String,
    pub position: Point3,
    pub is_light: bool,
    pub file: char,
    pub rank: u8,
}

/// Drawable projection of one piece. Rebuilt wholesale after every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardPiece {
    /// `color-kind-square`, e.g. `w-p-e2`.
    pub id: String,
    pub kind: PieceKind,
    pub color: PieceColor,
    pub square: Square,
    pub position: Point3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardGeometry {
    pub square_size: f32,
}

impl BoardGeometry {
    pub fn new(square_size: f32) -> Self {
        Self { square_size }
    }

    pub fn total_size(&self) -> f32 {
        BoardState::SIZE as f32 * self.square_size
    }

    pub fn half_size(&self) -> f32 {
        self.total_size() / 2.0
    }

    pub fn square_to_position(&self, square: Square) -> Point3 {
        square_to_position(square, self.square_size, self.half_size())
    }

    pub fn position_to_square(&self, x: f32, z: f32) -> Option<Square> {
        position_to_square(x, z, self.square_size, self.half_size())
    }

    pub fn squares(&self) -> Vec<BoardSquare> {
        Square::all()
            .map(|square| BoardSquare {
                id: square.to_string(),
                position: self.square_to_position(square),
                is_light: (square.file + square.rank) % 2 == 1,
                file: square.file_char(),
                rank: square.rank + 1,
            })
            .collect()
    }

    pub fn pieces(&self, board: &BoardState) -> Vec<BoardPiece> {
        board
            .occupied()
            .map(|(square, piece)| BoardPiece {
                id: format!("{}-{}-{}", piece.color.code(), piece.kind.code(), square),
                kind: piece.kind,
                color: piece.color,
                square,
                position: self.square_to_position(square),
            })
            .collect()
    }
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Piece;

    #[test]
    fn map_square_to_position() {
        let geometry = BoardGeometry::default();
        let a1 = geometry.square_to_position(Square::new(0, 0));
        assert_eq!(a1, Point3::new(-3.5, 0.0, -3.5));
        let h8 = geometry.square_to_position(Square::new(7, 7));
        assert_eq!(h8, Point3::new(3.5, 0.0, 3.5));
    }

    #[test]
    fn every_square_round_trips() {
        for square_size in [1.0_f32, 0.75, 2.5] {
            let geometry = BoardGeometry::new(square_size);
            for square in Square::all() {
                let point = geometry.square_to_position(square);
                assert_eq!(geometry.position_to_square(point.x, point.z), Some(square));
            }
        }
    }

    #[test]
    fn off_board_points_are_unmapped() {
        let geometry = BoardGeometry::default();
        assert_eq!(geometry.position_to_square(-4.01, 0.0), None);
        assert_eq!(geometry.position_to_square(0.0, 4.0), None);
        assert_eq!(geometry.position_to_square(f32::NAN, 0.0), None);
        assert_eq!(
            geometry.position_to_square(-3.99, 3.99),
            Some(Square::new(0, 7))
        );
    }

    #[test]
    fn square_list_has_parity() {
        let squares = BoardGeometry::default().squares();
        assert_eq!(squares.len(), 64);
        let a1 = squares.iter().find(|s| s.id == "a1").expect("a1 present");
        assert!(!a1.is_light);
        let h1 = squares.iter().find(|s| s.id == "h1").expect("h1 present");
        assert!(h1.is_light);
        assert_eq!(h1.file, 'h');
        assert_eq!(h1.rank, 1);
    }

    #[test]
    fn piece_ids_follow_color_kind_square() {
        let mut board = BoardState::empty();
        let e2 = Square::new(4, 1);
        board.set_piece(e2, Some(Piece::new(PieceColor::White, PieceKind::Pawn)));
        let pieces = BoardGeometry::default().pieces(&board);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].id, "w-p-e2");
        assert_eq!(pieces[0].position, Point3::new(0.5, 0.0, -2.5));
    }
}
