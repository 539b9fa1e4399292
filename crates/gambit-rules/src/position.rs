use gambit_types::board::{BoardState, Piece, PieceColor, PieceKind, Square};
use shakmaty::{
    fen::Fen, san::San, CastlingMode, Chess, EnPassantMode, File, Move, Position as _,
};

use crate::{
    convert::{
        from_color, from_piece, from_role, from_shakmaty_square, to_shakmaty_square,
    },
    RulesError,
};

/// Move metadata flags, mirroring the tags a UI needs to describe a move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveFlags {
    /// Ordinary capture. En passant is reported separately.
    pub capture: bool,
    pub en_passant: bool,
    pub promotion: bool,
    pub king_castle: bool,
    pub queen_castle: bool,
}

impl MoveFlags {
    pub fn is_castle(&self) -> bool {
        self.king_castle || self.queen_castle
    }
}

/// A legal move together with everything callers display or score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveInfo {
    pub color: PieceColor,
    pub piece: PieceKind,
    pub from: Square,
    /// Destination of the moving piece; the king's square for castling.
    pub to: Square,
    /// SAN including the `+`/`#` suffix.
    pub san: String,
    pub flags: MoveFlags,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub(crate) raw: Move,
}

/// User-level move intent: origin, destination and optional promotion piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl MoveRequest {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, kind: PieceKind) -> Self {
        self.promotion = Some(kind);
        self
    }
}

/// Immutable chess position. Cheap to clone; used both as the live position
/// inside [`crate::Game`] and as a scratch copy for lookahead.
#[derive(Debug, Clone)]
pub struct Position {
    chess: Chess,
}

impl Position {
    pub fn initial() -> Self {
        Self {
            chess: Chess::default(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let invalid = |reason: String| RulesError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };
        let parsed: Fen = fen.parse().map_err(|err| invalid(format!("{err}")))?;
        let chess: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|err| invalid(format!("{err}")))?;
        Ok(Self { chess })
    }

    pub fn fen(&self) -> String {
        Fen::from_position(&self.chess, EnPassantMode::Legal).to_string()
    }

    /// FEN without the move counters, used for repetition detection.
    pub(crate) fn repetition_key(&self) -> String {
        self.fen()
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn turn(&self) -> PieceColor {
        from_color(self.chess.turn())
    }

    pub fn is_check(&self) -> bool {
        self.chess.is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.chess.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.chess.is_stalemate()
    }

    /// Draw by insufficient material or the fifty-move rule. Repetition needs
    /// game history and is handled by [`crate::Game`].
    pub fn is_draw(&self) -> bool {
        self.chess.is_insufficient_material() || self.chess.halfmoves() >= 100
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.chess
            .board()
            .piece_at(to_shakmaty_square(square))
            .map(from_piece)
    }

    pub fn board(&self) -> BoardState {
        let mut board = BoardState::empty();
        for square in Square::all() {
            board.set_piece(square, self.piece_at(square));
        }
        board
    }

    pub fn legal_moves(&self) -> Vec<MoveInfo> {
        self.chess
            .legal_moves()
            .into_iter()
            .map(|m| self.describe(m))
            .collect()
    }

    pub fn legal_moves_from(&self, from: Square) -> Vec<MoveInfo> {
        let origin = to_shakmaty_square(from);
        self.chess
            .legal_moves()
            .into_iter()
            .filter(|m| m.from() == Some(origin))
            .map(|m| self.describe(m))
            .collect()
    }

    /// Positions reachable in one ply, without move metadata. Search uses
    /// this to skip SAN generation.
    pub fn successors(&self) -> Vec<Position> {
        self.chess
            .legal_moves()
            .into_iter()
            .map(|m| {
                let mut next = self.chess.clone();
                next.play_unchecked(m.clone());
                Position { chess: next }
            })
            .collect()
    }

    /// Returns the position after `mv`, leaving `self` untouched.
    pub fn play(&self, mv: &MoveInfo) -> Result<Position, RulesError> {
        self.chess
            .clone()
            .play(mv.raw.clone())
            .map(|chess| Position { chess })
            .map_err(|_| RulesError::IllegalMove {
                from: mv.from,
                to: mv.to,
            })
    }

    /// Resolves a user request to a legal move. Promotions default to a queen.
    pub fn find_move(&self, request: &MoveRequest) -> Result<MoveInfo, RulesError> {
        let promotion = request.promotion.unwrap_or(PieceKind::Queen);
        self.legal_moves_from(request.from)
            .into_iter()
            .find(|mv| {
                mv.to == request.to && mv.promotion.map_or(true, |kind| kind == promotion)
            })
            .ok_or(RulesError::IllegalMove {
                from: request.from,
                to: request.to,
            })
    }

    fn describe(&self, m: Move) -> MoveInfo {
        let mut after = self.chess.clone();
        after.play_unchecked(m.clone());
        let mut san = San::from_move(&self.chess, m.clone()).to_string();
        if after.is_checkmate() {
            san.push('#');
        } else if after.is_check() {
            san.push('+');
        }

        let mut flags = MoveFlags {
            capture: m.is_capture() && !m.is_en_passant(),
            en_passant: m.is_en_passant(),
            promotion: m.is_promotion(),
            ..MoveFlags::default()
        };

        let from = m.from().map(from_shakmaty_square);
        let to = match &m {
            Move::Castle { king, rook } => {
                let king_side = rook.file() > king.file();
                if king_side {
                    flags.king_castle = true;
                } else {
                    flags.queen_castle = true;
                }
                let file = if king_side { File::G } else { File::C };
                from_shakmaty_square(shakmaty::Square::from_coords(file, king.rank()))
            }
            other => from_shakmaty_square(other.to()),
        };

        MoveInfo {
            color: self.turn(),
            piece: from_role(m.role()),
            from: from.unwrap_or(to),
            to,
            san,
            flags,
            captured: m.capture().map(from_role),
            promotion: m.promotion().map(from_role),
            raw: m,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::initial()
    }
}
