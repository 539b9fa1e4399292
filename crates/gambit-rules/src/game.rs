use gambit_types::board::{BoardState, Piece, PieceColor, Square};
use tracing::debug;

use crate::{MoveInfo, MoveRequest, Position, RulesError};

/// Live rules engine for one game: the current position plus the stack of
/// earlier positions that makes undo and repetition detection possible.
#[derive(Debug, Clone, Default)]
pub struct Game {
    position: Position,
    undo_stack: Vec<(Position, MoveInfo)>,
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        Ok(Self {
            position: Position::from_fen(fen)?,
            undo_stack: Vec::new(),
        })
    }

    pub fn reset(&mut self) {
        self.position = Position::initial();
        self.undo_stack.clear();
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Independent copy of the current position for lookahead.
    pub fn snapshot(&self) -> Position {
        self.position.clone()
    }

    pub fn turn(&self) -> PieceColor {
        self.position.turn()
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    /// Insufficient material, fifty-move rule or threefold repetition.
    pub fn is_draw(&self) -> bool {
        self.position.is_draw() || self.is_threefold_repetition()
    }

    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_stalemate() || self.is_draw()
    }

    pub fn is_threefold_repetition(&self) -> bool {
        let key = self.position.repetition_key();
        let earlier = self
            .undo_stack
            .iter()
            .filter(|(position, _)| position.repetition_key() == key)
            .count();
        earlier + 1 >= 3
    }

    pub fn legal_moves(&self) -> Vec<MoveInfo> {
        self.position.legal_moves()
    }

    pub fn legal_moves_from(&self, square: Square) -> Vec<MoveInfo> {
        self.position.legal_moves_from(square)
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.piece_at(square)
    }

    pub fn board(&self) -> BoardState {
        self.position.board()
    }

    pub fn fen(&self) -> String {
        self.position.fen()
    }

    /// Plays a user-level request, promoting to a queen unless told otherwise.
    pub fn apply(&mut self, request: MoveRequest) -> Result<MoveInfo, RulesError> {
        let mv = self.position.find_move(&request)?;
        self.apply_move(&mv)
    }

    /// Plays a move previously produced by [`Game::legal_moves`].
    pub fn apply_move(&mut self, mv: &MoveInfo) -> Result<MoveInfo, RulesError> {
        let next = self.position.play(mv)?;
        let previous = std::mem::replace(&mut self.position, next);
        self.undo_stack.push((previous, mv.clone()));
        debug!(san = %mv.san, ply = self.undo_stack.len(), "move applied");
        Ok(mv.clone())
    }

    /// Reverts the most recent move. `None` when nothing has been played.
    pub fn undo(&mut self) -> Option<MoveInfo> {
        let (previous, mv) = self.undo_stack.pop()?;
        self.position = previous;
        Some(mv)
    }

    pub fn history(&self) -> impl Iterator<Item = &MoveInfo> {
        self.undo_stack.iter().map(|(_, mv)| mv)
    }

    pub fn ply_count(&self) -> usize {
        self.undo_stack.len()
    }
}
