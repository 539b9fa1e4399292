use gambit_types::board::{Piece, PieceColor, PieceKind, Square};
use shakmaty::{Color, File, Rank, Role};

pub(crate) fn to_shakmaty_square(square: Square) -> shakmaty::Square {
    shakmaty::Square::from_coords(File::new(square.file as u32), Rank::new(square.rank as u32))
}

pub(crate) fn from_shakmaty_square(square: shakmaty::Square) -> Square {
    Square::new(square.file() as u8, square.rank() as u8)
}

pub(crate) fn from_color(color: Color) -> PieceColor {
    match color {
        Color::White => PieceColor::White,
        Color::Black => PieceColor::Black,
    }
}

pub(crate) fn from_role(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

pub(crate) fn from_piece(piece: shakmaty::Piece) -> Piece {
    Piece::new(from_color(piece.color), from_role(piece.role))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squares_round_trip() {
        for square in Square::all() {
            assert_eq!(from_shakmaty_square(to_shakmaty_square(square)), square);
        }
        assert_eq!(
            to_shakmaty_square("e4".parse().expect("e4")),
            shakmaty::Square::E4
        );
    }
}
