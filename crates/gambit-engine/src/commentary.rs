//! Human-readable remarks about moves and game transitions.

use gambit_rules::MoveInfo;
use gambit_types::board::PieceColor;

use crate::random::RandomSource;

/// Static text the commentator draws from.
#[derive(Debug)]
pub struct CommentaryTable {
    pub check: &'static str,
    /// `{piece}` is replaced by the captured piece's name.
    pub capture: &'static str,
    pub promotion: &'static str,
    pub castling: &'static str,
    pub en_passant: &'static str,
    /// Keyed by SAN prefix of the first move of the game.
    pub openings: &'static [(&'static str, &'static str)],
    pub generic: &'static [&'static str],
    pub tips: &'static [&'static str],
}

pub const TEMPLATES: CommentaryTable = CommentaryTable {
    check: "Check! Your king is under attack.",
    capture: "Captured a {piece}!",
    promotion: "Pawn promoted to Queen!",
    castling: "Castling move - a good defensive strategy!",
    en_passant: "En Passant capture - nice tactical move!",
    openings: &[
        (
            "e4",
            "King's Pawn Opening - a classic first move that controls the center.",
        ),
        (
            "d4",
            "Queen's Pawn Opening - solid approach to control the center.",
        ),
        ("Nf3", "Réti Opening - a hypermodern approach."),
        (
            "c4",
            "English Opening - controlling the center from the flank.",
        ),
    ],
    generic: &[
        "Good move!",
        "Interesting choice.",
        "That opens up new possibilities.",
        "Developing your pieces well.",
        "Building a strong position.",
        "Increasing pressure on the center.",
        "Improving your pawn structure.",
    ],
    tips: &[
        "Tip: Try to control the center of the board early.",
        "Tip: Develop your knights and bishops before making major moves.",
        "Tip: Castle early to protect your king.",
        "Tip: Connect your rooks by clearing the back rank.",
        "Tip: Avoid moving the same piece multiple times in the opening.",
        "Tip: Look for forks that can attack two pieces at once.",
        "Tip: Create passed pawns when possible - they can become powerful.",
    ],
};

pub const GAME_STARTED: &str = "Game started! White to move.";
pub const GAME_RESET: &str = "Game reset! White to move.";
pub const MOVE_UNDONE: &str = "Move undone.";
pub const DRAW: &str = "The game ends in a draw.";
pub const STALEMATE: &str = "Stalemate! The game ends in a draw.";

pub fn checkmate(winner: PieceColor) -> String {
    format!("Checkmate! {} wins the game.", winner.name())
}

pub fn timeout(flagged: PieceColor) -> String {
    format!(
        "{} ran out of time. {} wins on time.",
        flagged.name(),
        flagged.opponent().name()
    )
}

/// Commentary prefixed with the move itself, as shown for computer replies.
pub fn with_san(san: &str, text: &str) -> String {
    format!("{san}. {text}")
}

pub struct Commentary {
    table: &'static CommentaryTable,
}

impl Default for Commentary {
    fn default() -> Self {
        Self { table: &TEMPLATES }
    }
}

impl Commentary {
    /// Describes a move that has just been played.
    ///
    /// `in_check_after` is whether the side now to move is in check and
    /// `history_len` is the number of plies recorded before this one. The
    /// first matching rule wins: capture, en passant, promotion, castling,
    /// check, named opening, then a random generic remark.
    pub fn describe_move(
        &self,
        mv: &MoveInfo,
        in_check_after: bool,
        history_len: usize,
        rng: &mut dyn RandomSource,
    ) -> String {
        if mv.flags.capture {
            let piece = match mv.captured {
                Some(kind) if kind.value() > 0 => kind.name(),
                _ => "piece",
            };
            return self.table.capture.replace("{piece}", piece);
        }
        if mv.flags.en_passant {
            return self.table.en_passant.to_string();
        }
        if mv.flags.promotion {
            return self.table.promotion.to_string();
        }
        if mv.flags.is_castle() {
            return self.table.castling.to_string();
        }
        if in_check_after {
            return self.table.check.to_string();
        }
        if history_len == 0 {
            if let Some(text) = self.opening(&mv.san) {
                return text.to_string();
            }
        }
        pick(self.table.generic, rng).to_string()
    }

    pub fn opening(&self, san: &str) -> Option<&'static str> {
        self.table
            .openings
            .iter()
            .find(|(prefix, _)| san.starts_with(prefix))
            .map(|(_, text)| *text)
    }

    pub fn tip(&self, rng: &mut dyn RandomSource) -> &'static str {
        pick(self.table.tips, rng)
    }

}

fn pick(lines: &'static [&'static str], rng: &mut dyn RandomSource) -> &'static str {
    if lines.is_empty() {
        return "";
    }
    lines[rng.pick_index(lines.len())]
}
