//! Synchronous game-session state machine.
//!
//! Every control operation mutates the session and returns the
//! [`Directive`]s the async runtime must carry out: starting or stopping the
//! clock task and scheduling a deferred computer reply. Observable changes
//! are queued as [`SessionEvent`]s and drained by the runtime.

use chrono::Utc;
use gambit_engine::{commentary, Commentary, Opponent, Strategy, TurnContext};
use gambit_rules::{Game, MoveInfo, MoveRequest};
use gambit_types::{
    board::{PieceColor, Square},
    config::GambitConfig,
    events::{EngineEvent, EventKind, EventPayload, LifecyclePhase, MoveEvent, SessionEvent},
    game::{GameClocks, GameSnapshot, GameStatus, LastMove, Mover},
    geometry::{BoardGeometry, BoardPiece, BoardSquare, Point3},
    time_control::{ClockBudgets, SkillLevel},
};
use tracing::{debug, info, warn};

/// Side effect requested from the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// (Re)start the once-per-interval clock, replacing any running one.
    StartClock,
    StopClock,
    /// Run [`Session::play_computer_reply`] after the reply delay.
    ScheduleReply { epoch: u64 },
}

pub struct Session {
    game: Game,
    geometry: BoardGeometry,
    budgets: ClockBudgets,
    opponent: Box<dyn Opponent>,
    commentary: Commentary,
    status: GameStatus,
    user_color: PieceColor,
    skill_level: SkillLevel,
    clocks: GameClocks,
    squares: Vec<BoardSquare>,
    pieces: Vec<BoardPiece>,
    selected: Option<Square>,
    possible_moves: Vec<Square>,
    highlight: Option<Point3>,
    last_move: Option<LastMove>,
    commentary_text: String,
    move_history: Vec<String>,
    /// Bumped whenever a pending reply must be discarded.
    epoch: u64,
    outbox: Vec<SessionEvent>,
}

impl Session {
    pub fn new(config: &GambitConfig, mut opponent: Box<dyn Opponent>) -> Self {
        let geometry = BoardGeometry::new(config.board.square_size);
        let skill_level = config.session.skill_level;
        let strategy = config
            .session
            .opponent
            .as_deref()
            .map_or(Strategy::from(skill_level), Strategy::from_name);
        opponent.set_strategy(strategy);
        let game = Game::new();
        let pieces = geometry.pieces(&game.board());

        Self {
            game,
            squares: geometry.squares(),
            pieces,
            geometry,
            budgets: config.clocks,
            opponent,
            commentary: Commentary::default(),
            status: GameStatus::Idle,
            user_color: config.session.user_color,
            skill_level,
            clocks: GameClocks::uniform(config.clocks.for_skill(skill_level)),
            selected: None,
            possible_moves: Vec::new(),
            highlight: None,
            last_move: None,
            commentary_text: commentary::GAME_STARTED.to_string(),
            move_history: Vec::new(),
            epoch: 0,
            outbox: Vec::new(),
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn user_color(&self) -> PieceColor {
        self.user_color
    }

    pub fn skill_level(&self) -> SkillLevel {
        self.skill_level
    }

    pub fn clocks(&self) -> GameClocks {
        self.clocks
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn geometry(&self) -> BoardGeometry {
        self.geometry
    }

    pub fn move_history(&self) -> &[String] {
        &self.move_history
    }

    pub fn commentary(&self) -> &str {
        &self.commentary_text
    }

    pub fn selected_square(&self) -> Option<Square> {
        self.selected
    }

    pub fn possible_moves(&self) -> &[Square] {
        &self.possible_moves
    }

    pub fn is_users_turn(&self) -> bool {
        self.game.turn() == self.user_color
    }

    /// Random hint for an idle board.
    pub fn tip(&mut self) -> &'static str {
        self.commentary.tip(self.opponent.rng())
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            status: self.status,
            user_color: self.user_color,
            skill_level: self.skill_level,
            side_to_move: self.game.turn(),
            in_check: self.game.is_check(),
            clocks: self.clocks,
            pieces: self.pieces.clone(),
            squares: self.squares.clone(),
            selected_square: self.selected,
            possible_moves: self.possible_moves.clone(),
            highlight: self.highlight,
            last_move: self.last_move,
            commentary: self.commentary_text.clone(),
            move_history: self.move_history.clone(),
            history_index: self.move_history.len() as i32 - 1,
            fen: self.game.fen(),
            created_at: Utc::now(),
        }
    }

    /// `idle` or `paused` to `ongoing`.
    pub fn start(&mut self) -> Vec<Directive> {
        let phase = match self.status {
            GameStatus::Idle => LifecyclePhase::Started,
            GameStatus::Paused => LifecyclePhase::Resumed,
            _ => return Vec::new(),
        };
        self.resume(phase)
    }

    pub fn toggle_pause(&mut self) -> Vec<Directive> {
        match self.status {
            GameStatus::Ongoing => {
                self.status = GameStatus::Paused;
                info!("session paused");
                self.lifecycle(LifecyclePhase::Paused, None);
                vec![Directive::StopClock]
            }
            GameStatus::Paused => self.resume(LifecyclePhase::Resumed),
            _ => Vec::new(),
        }
    }

    fn resume(&mut self, phase: LifecyclePhase) -> Vec<Directive> {
        self.status = GameStatus::Ongoing;
        info!(?phase, user = self.user_color.name(), "session running");
        self.lifecycle(phase, None);
        let mut directives = vec![Directive::StartClock];
        directives.extend(self.reply_if_due());
        directives
    }

    /// Clicks the board-space point `(x, z)`. Off-board points are ignored.
    pub fn click(&mut self, x: f32, z: f32) -> Vec<Directive> {
        match self.geometry.position_to_square(x, z) {
            Some(square) => self.click_square(square),
            None => {
                debug!(x, z, "click outside the board");
                Vec::new()
            }
        }
    }

    pub fn click_square(&mut self, square: Square) -> Vec<Directive> {
        if self.status != GameStatus::Ongoing || !self.is_users_turn() {
            return Vec::new();
        }

        let Some(from) = self.selected.take() else {
            self.select(square);
            return Vec::new();
        };
        let destinations = std::mem::take(&mut self.possible_moves);
        if !destinations.contains(&square) {
            return Vec::new();
        }

        match self.game.apply(MoveRequest::new(from, square)) {
            Ok(mv) => {
                self.record_move(&mv, Mover::User);
                if self.status.is_terminal() {
                    vec![Directive::StopClock]
                } else {
                    vec![Directive::ScheduleReply { epoch: self.epoch }]
                }
            }
            Err(err) => {
                warn!(%err, %from, to = %square, "rejected user move");
                Vec::new()
            }
        }
    }

    fn select(&mut self, square: Square) {
        let Some(piece) = self.game.piece_at(square) else {
            return;
        };
        if piece.color != self.game.turn() {
            return;
        }
        self.selected = Some(square);
        self.possible_moves = self
            .game
            .legal_moves_from(square)
            .into_iter()
            .map(|mv| mv.to)
            .collect();
        debug!(%square, destinations = self.possible_moves.len(), "piece selected");
    }

    /// Hover marker drawn by the renderer.
    pub fn set_highlight(&mut self, point: Option<Point3>) {
        self.highlight = point;
    }

    /// Deferred computer move. Discarded unless the game is still running,
    /// it is the computer's turn and no reset or settings change happened
    /// since it was scheduled.
    pub fn play_computer_reply(&mut self, epoch: u64) -> Vec<Directive> {
        if epoch != self.epoch || self.status != GameStatus::Ongoing || self.is_users_turn() {
            debug!(
                epoch,
                current = self.epoch,
                status = %self.status,
                "computer reply skipped"
            );
            return Vec::new();
        }

        let position = self.game.snapshot();
        let moves = position.legal_moves();
        let ctx = TurnContext {
            position: &position,
            moves: &moves,
            user_color: self.user_color,
        };
        let decision = match self.opponent.choose(&ctx) {
            Ok(decision) => decision,
            Err(err) => {
                warn!(%err, "opponent produced no move");
                return Vec::new();
            }
        };

        let mv = match self.game.apply_move(&decision.chosen) {
            Ok(mv) => mv,
            Err(err) => {
                warn!(%err, san = %decision.chosen.san, "opponent move rejected");
                return Vec::new();
            }
        };

        self.outbox.push(SessionEvent::new(
            EventKind::EngineDecision,
            EventPayload::Engine(EngineEvent {
                metrics: decision.metrics,
                chosen: mv.san.clone(),
            }),
        ));
        self.record_move(&mv, Mover::Computer);

        if self.status.is_terminal() {
            vec![Directive::StopClock]
        } else {
            Vec::new()
        }
    }

    /// User moves are commented on too; only computer replies get the SAN prefix.
    fn record_move(&mut self, mv: &MoveInfo, mover: Mover) {
        let text = self.commentary.describe_move(
            mv,
            self.game.is_check(),
            self.move_history.len(),
            self.opponent.rng(),
        );
        self.commentary_text = match mover {
            Mover::User => text,
            Mover::Computer => commentary::with_san(&mv.san, &text),
        };
        self.move_history.push(mv.san.clone());
        self.last_move = Some(LastMove {
            from: mv.from,
            to: mv.to,
        });
        self.refresh_pieces();
        info!(?mover, san = %mv.san, ply = self.move_history.len(), "move played");

        self.outbox.push(SessionEvent::new(
            EventKind::Move,
            EventPayload::Move(MoveEvent {
                mover,
                san: mv.san.clone(),
                from: mv.from,
                to: mv.to,
                commentary: self.commentary_text.clone(),
            }),
        ));
        self.check_game_over();
    }

    fn check_game_over(&mut self) {
        let (status, text) = if self.game.is_checkmate() {
            let winner = self.game.turn().opponent();
            (GameStatus::Checkmate(winner), commentary::checkmate(winner))
        } else if self.game.is_draw() {
            (GameStatus::Draw, commentary::DRAW.to_string())
        } else if self.game.is_stalemate() {
            (GameStatus::Stalemate, commentary::STALEMATE.to_string())
        } else {
            return;
        };
        self.finish(status, text);
    }

    fn finish(&mut self, status: GameStatus, text: String) {
        self.status = status;
        self.commentary_text = text;
        self.selected = None;
        self.possible_moves.clear();
        info!(%status, "game over");
        self.lifecycle(LifecyclePhase::GameOver, Some(self.commentary_text.clone()));
    }

    /// Takes back the user's last move together with the computer's answer,
    /// or just the last ply when the computer is to move.
    pub fn undo(&mut self) -> Vec<Directive> {
        if self.move_history.is_empty() {
            return Vec::new();
        }

        let plies = if self.is_users_turn() {
            self.move_history.len().min(2)
        } else {
            1
        };
        for _ in 0..plies {
            if self.game.undo().is_none() {
                break;
            }
            self.move_history.pop();
        }

        self.last_move = self.game.history().last().map(|mv| LastMove {
            from: mv.from,
            to: mv.to,
        });
        self.refresh_pieces();
        self.commentary_text = commentary::MOVE_UNDONE.to_string();
        self.selected = None;
        self.possible_moves.clear();
        debug!(plies, remaining = self.move_history.len(), "moves undone");

        let mut directives = Vec::new();
        if matches!(
            self.status,
            GameStatus::Checkmate(_) | GameStatus::Draw | GameStatus::Stalemate
        ) {
            self.status = GameStatus::Ongoing;
            directives.push(Directive::StartClock);
        }
        self.lifecycle(LifecyclePhase::Undone, None);
        directives.extend(self.reply_if_due());
        directives
    }

    /// Back to the initial position, `idle`, with full clocks.
    pub fn reset(&mut self) -> Vec<Directive> {
        self.game.reset();
        self.refresh_pieces();
        self.status = GameStatus::Idle;
        self.selected = None;
        self.possible_moves.clear();
        self.last_move = None;
        self.move_history.clear();
        self.commentary_text = commentary::GAME_RESET.to_string();
        self.clocks = GameClocks::uniform(self.budgets.for_skill(self.skill_level));
        self.epoch += 1;
        info!(epoch = self.epoch, "session reset");
        self.lifecycle(LifecyclePhase::Reset, None);

        let mut directives = vec![Directive::StopClock];
        if self.user_color == PieceColor::Black {
            // Only fires once the game is started.
            directives.push(Directive::ScheduleReply { epoch: self.epoch });
        }
        directives
    }

    pub fn set_user_color(&mut self, color: PieceColor) -> Vec<Directive> {
        self.user_color = color;
        self.lifecycle(
            LifecyclePhase::SettingsChanged,
            Some(format!("user plays {}", color.name())),
        );
        self.reset()
    }

    pub fn set_skill_level(&mut self, level: SkillLevel) -> Vec<Directive> {
        self.skill_level = level;
        self.opponent.set_strategy(Strategy::from(level));
        self.clocks = GameClocks::uniform(self.budgets.for_skill(level));
        self.epoch += 1;
        info!(%level, epoch = self.epoch, "skill level changed");
        self.lifecycle(
            LifecyclePhase::SettingsChanged,
            Some(format!("skill level {level}")),
        );

        if self.status != GameStatus::Ongoing {
            return Vec::new();
        }
        let mut directives = vec![Directive::StartClock];
        directives.extend(self.reply_if_due());
        directives
    }

    /// One clock interval elapsed for the side to move.
    pub fn tick(&mut self) -> Vec<Directive> {
        if self.status != GameStatus::Ongoing {
            return Vec::new();
        }
        let side = self.game.turn();
        if self.clocks.decrement(side) > 0 {
            return Vec::new();
        }
        self.finish(GameStatus::Timeout(side), commentary::timeout(side));
        vec![Directive::StopClock]
    }

    fn reply_if_due(&self) -> Option<Directive> {
        (self.status == GameStatus::Ongoing && !self.is_users_turn())
            .then_some(Directive::ScheduleReply { epoch: self.epoch })
    }

    fn refresh_pieces(&mut self) {
        self.pieces = self.geometry.pieces(&self.game.board());
    }

    fn lifecycle(&mut self, phase: LifecyclePhase, details: Option<String>) {
        self.outbox
            .push(SessionEvent::lifecycle(phase, self.status, details));
    }
}
