use std::{
    collections::{HashMap, VecDeque},
    sync::mpsc::{Receiver, TryRecvError},
    time::Duration,
};

use anyhow::Result;
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use gambit_types::{
    board::{PieceColor, Square},
    events::{EventPayload, SessionEvent},
    game::{GameSnapshot, GameStatus, Mover},
    geometry::{BoardPiece, Point3},
    time_control::SkillLevel,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Terminal,
};
use tokio::sync::mpsc::UnboundedSender;

const MAX_LOG_ENTRIES: usize = 120;

pub enum UiMessage {
    Event(SessionEvent),
    Hint(&'static str),
    Shutdown,
}

/// User intent forwarded to the session runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Start,
    TogglePause,
    Click { x: f32, z: f32 },
    Hover(Option<Point3>),
    Undo,
    Reset,
    SetColor(PieceColor),
    SetSkill(SkillLevel),
    Tip,
    Quit,
}

struct UiState {
    snapshot: Option<GameSnapshot>,
    cursor: Square,
    logs: VecDeque<String>,
    hint: Option<&'static str>,
}

pub fn run(
    receiver: Receiver<UiMessage>,
    commands: UnboundedSender<Command>,
    summary: String,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let res = run_loop(&mut terminal, receiver, &commands, summary.as_str());

    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    // Unblocks the async side if the loop ended on its own.
    let _ = commands.send(Command::Quit);
    res
}

fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    receiver: Receiver<UiMessage>,
    commands: &UnboundedSender<Command>,
    summary: &str,
) -> Result<()> {
    let mut state = UiState {
        snapshot: None,
        cursor: Square::new(4, 1),
        logs: VecDeque::with_capacity(MAX_LOG_ENTRIES),
        hint: None,
    };

    loop {
        loop {
            match receiver.try_recv() {
                Ok(UiMessage::Event(event)) => {
                    if let Some(snapshot) = event.snapshot() {
                        state.snapshot = Some(snapshot.clone());
                    } else {
                        if state.logs.len() == MAX_LOG_ENTRIES {
                            state.logs.pop_front();
                        }
                        state.logs.push_back(format_event(&event));
                    }
                }
                Ok(UiMessage::Hint(hint)) => state.hint = Some(hint),
                Ok(UiMessage::Shutdown) | Err(TryRecvError::Disconnected) => return Ok(()),
                Err(TryRecvError::Empty) => break,
            }
        }

        terminal.draw(|f| draw(f, &state, summary))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let CEvent::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let user_color = state
            .snapshot
            .as_ref()
            .map(|snapshot| snapshot.user_color)
            .unwrap_or_default();

        let command = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                state.cursor = move_cursor(state.cursor, key.code, user_color);
                state
                    .snapshot
                    .as_ref()
                    .and_then(|snapshot| square_point(snapshot, state.cursor))
                    .map(|point| Command::Hover(Some(point)))
            }
            KeyCode::Enter | KeyCode::Char(' ') => state
                .snapshot
                .as_ref()
                .and_then(|snapshot| square_point(snapshot, state.cursor))
                .map(|point| Command::Click {
                    x: point.x,
                    z: point.z,
                }),
            KeyCode::Char('s') => Some(Command::Start),
            KeyCode::Char('p') => Some(Command::TogglePause),
            KeyCode::Char('u') => Some(Command::Undo),
            KeyCode::Char('r') => Some(Command::Reset),
            KeyCode::Char('c') => Some(Command::SetColor(user_color.opponent())),
            KeyCode::Char('1') => Some(Command::SetSkill(SkillLevel::Beginner)),
            KeyCode::Char('2') => Some(Command::SetSkill(SkillLevel::Intermediate)),
            KeyCode::Char('3') => Some(Command::SetSkill(SkillLevel::Advanced)),
            KeyCode::Char('t') => Some(Command::Tip),
            _ => None,
        };

        if let Some(command) = command {
            if commands.send(command).is_err() {
                return Ok(());
            }
        }
    }
}

fn draw(f: &mut ratatui::Frame, state: &UiState, summary: &str) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)].as_ref())
        .split(f.size());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)].as_ref())
        .split(rows[1]);
    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(5),
                Constraint::Length(6),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(body[1]);

    let header = Paragraph::new(header_lines(state.snapshot.as_ref(), summary))
        .block(Block::default().borders(Borders::ALL).title("Gambit"));
    f.render_widget(header, rows[0]);

    let board_text = match &state.snapshot {
        Some(snapshot) => board_lines(snapshot, state.cursor),
        None => vec![Line::from("waiting for the session...")],
    };
    let board = Paragraph::new(board_text)
        .block(Block::default().borders(Borders::ALL).title("Board"));
    f.render_widget(board, body[0]);

    let mut commentary = vec![Line::from(
        state
            .snapshot
            .as_ref()
            .map(|snapshot| snapshot.commentary.clone())
            .unwrap_or_default(),
    )];
    if let Some(hint) = state.hint {
        commentary.push(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::Green),
        )));
    }
    let commentary = Paragraph::new(commentary)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Commentary"));
    f.render_widget(commentary, side[0]);

    let history = state
        .snapshot
        .as_ref()
        .map(|snapshot| format_history(&snapshot.move_history))
        .unwrap_or_default();
    let history = Paragraph::new(history)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Moves"));
    f.render_widget(history, side[1]);

    let items: Vec<ListItem> = state
        .logs
        .iter()
        .rev()
        .map(|entry| ListItem::new(entry.clone()))
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Events  [s]tart [p]ause [u]ndo [r]eset [c]olour [1-3] skill [t]ip [q]uit"),
    );
    f.render_widget(list, side[2]);
}

fn header_lines(snapshot: Option<&GameSnapshot>, summary: &str) -> Vec<Line<'static>> {
    let Some(snapshot) = snapshot else {
        return vec![Line::from(summary.to_string())];
    };
    let status_style = match snapshot.status {
        GameStatus::Ongoing => Style::default().fg(Color::Green),
        GameStatus::Idle | GameStatus::Paused => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    };
    vec![
        Line::from(vec![
            Span::styled(snapshot.status.to_string(), status_style),
            Span::raw(format!(
                "  you: {}  skill: {}  to move: {}{}",
                snapshot.user_color.name(),
                snapshot.skill_level,
                snapshot.side_to_move.name(),
                if snapshot.in_check { " (check)" } else { "" }
            )),
        ]),
        Line::from(vec![
            Span::styled("White ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format_clock(snapshot.clocks.white_secs)),
            Span::styled("  Black ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format_clock(snapshot.clocks.black_secs)),
            Span::raw(format!("  | {summary}")),
        ]),
    ]
}

fn board_lines(snapshot: &GameSnapshot, cursor: Square) -> Vec<Line<'static>> {
    let pieces: HashMap<Square, &BoardPiece> = snapshot
        .pieces
        .iter()
        .map(|piece| (piece.square, piece))
        .collect();
    let light: HashMap<Square, bool> = snapshot
        .squares
        .iter()
        .filter_map(|square| {
            square
                .id
                .parse::<Square>()
                .ok()
                .map(|parsed| (parsed, square.is_light))
        })
        .collect();
    let flipped = snapshot.user_color == PieceColor::Black;
    let order = |i: u8| if flipped { i } else { 7 - i };

    let mut lines = Vec::with_capacity(9);
    for row in 0..8u8 {
        let rank = order(row);
        let mut spans = vec![Span::raw(format!("{} ", rank + 1))];
        for col in 0..8u8 {
            let file = if flipped { 7 - col } else { col };
            let square = Square::new(file, rank);
            let glyph = pieces
                .get(&square)
                .map(|piece| piece_glyph(piece))
                .unwrap_or(' ');

            let mut bg = if light.get(&square).copied().unwrap_or(false) {
                Color::Rgb(240, 217, 181)
            } else {
                Color::Rgb(181, 136, 99)
            };
            if snapshot
                .last_move
                .is_some_and(|last| last.from == square || last.to == square)
            {
                bg = Color::Rgb(205, 210, 106);
            }
            if snapshot.possible_moves.contains(&square) {
                bg = Color::Green;
            }
            if snapshot.selected_square == Some(square) {
                bg = Color::Blue;
            }
            if square == cursor {
                bg = Color::Yellow;
            }
            let fg = match pieces.get(&square).map(|piece| piece.color) {
                Some(PieceColor::White) => Color::White,
                _ => Color::Black,
            };
            spans.push(Span::styled(
                format!(" {glyph} "),
                Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
            ));
        }
        lines.push(Line::from(spans));
    }

    let files: String = (0..8u8)
        .map(|col| {
            let file = if flipped { 7 - col } else { col };
            format!(" {} ", (b'a' + file) as char)
        })
        .collect();
    lines.push(Line::from(format!("  {files}")));
    lines
}

fn piece_glyph(piece: &BoardPiece) -> char {
    let code = piece.kind.code();
    match piece.color {
        PieceColor::White => code.to_ascii_uppercase(),
        PieceColor::Black => code,
    }
}

/// Cursor movement in screen directions; the board is drawn from the
/// user's side.
fn move_cursor(cursor: Square, key: KeyCode, user_color: PieceColor) -> Square {
    let flip: i8 = if user_color == PieceColor::Black { -1 } else { 1 };
    let (df, dr) = match key {
        KeyCode::Up => (0, flip),
        KeyCode::Down => (0, -flip),
        KeyCode::Left => (-flip, 0),
        KeyCode::Right => (flip, 0),
        _ => (0, 0),
    };
    cursor.offset(df, dr).unwrap_or(cursor)
}

/// Board-space centre of `square`, as published in the snapshot.
fn square_point(snapshot: &GameSnapshot, square: Square) -> Option<Point3> {
    let id = square.to_string();
    snapshot
        .squares
        .iter()
        .find(|candidate| candidate.id == id)
        .map(|candidate| candidate.position)
}

fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn format_history(history: &[String]) -> String {
    history
        .chunks(2)
        .enumerate()
        .map(|(idx, pair)| format!("{}. {}", idx + 1, pair.join(" ")))
        .collect::<Vec<_>>()
        .join("  ")
}

fn format_event(event: &SessionEvent) -> String {
    let timestamp = event.timestamp.format("%H:%M:%S");
    match &event.payload {
        EventPayload::Lifecycle(lifecycle) => format!(
            "[{}] {:?} ({}) {}",
            timestamp,
            lifecycle.phase,
            lifecycle.status,
            lifecycle.details.clone().unwrap_or_default()
        ),
        EventPayload::Move(mv) => format!(
            "[{}] {} {} {}-{}",
            timestamp,
            match mv.mover {
                Mover::User => "you",
                Mover::Computer => "computer",
            },
            mv.san,
            mv.from,
            mv.to
        ),
        EventPayload::Engine(engine) => format!(
            "[{}] {} picked {} from {} candidates, nodes={} in {} ms",
            timestamp,
            engine.metrics.strategy,
            engine.chosen,
            engine.metrics.candidates,
            engine.metrics.nodes,
            engine.metrics.duration_ms
        ),
        EventPayload::Board(_) => format!("[{}] board updated", timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_types::{events::LifecyclePhase, game::GameClocks, geometry::BoardGeometry};

    fn snapshot(user_color: PieceColor) -> GameSnapshot {
        let geometry = BoardGeometry::default();
        GameSnapshot {
            status: GameStatus::Idle,
            user_color,
            skill_level: SkillLevel::Intermediate,
            side_to_move: PieceColor::White,
            in_check: false,
            clocks: GameClocks::uniform(900),
            pieces: Vec::new(),
            squares: geometry.squares(),
            selected_square: None,
            possible_moves: Vec::new(),
            highlight: None,
            last_move: None,
            commentary: String::new(),
            move_history: Vec::new(),
            history_index: -1,
            fen: String::new(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn cursor_moves_follow_the_users_side() {
        let e2 = Square::new(4, 1);
        assert_eq!(move_cursor(e2, KeyCode::Up, PieceColor::White), Square::new(4, 2));
        assert_eq!(move_cursor(e2, KeyCode::Up, PieceColor::Black), Square::new(4, 0));
        assert_eq!(move_cursor(e2, KeyCode::Left, PieceColor::Black), Square::new(5, 1));

        let a1 = Square::new(0, 0);
        assert_eq!(move_cursor(a1, KeyCode::Left, PieceColor::White), a1);
    }

    #[test]
    fn cursor_square_maps_back_through_geometry() {
        let snapshot = snapshot(PieceColor::White);
        let geometry = BoardGeometry::default();
        for square in Square::all() {
            let point = square_point(&snapshot, square).expect("square on board");
            assert_eq!(geometry.position_to_square(point.x, point.z), Some(square));
        }
    }

    #[test]
    fn board_is_drawn_from_the_users_side() {
        let white = board_lines(&snapshot(PieceColor::White), Square::new(4, 1));
        assert_eq!(white.len(), 9);
        assert_eq!(white[0].spans[0].content, "8 ");
        let black = board_lines(&snapshot(PieceColor::Black), Square::new(4, 1));
        assert_eq!(black[0].spans[0].content, "1 ");
    }

    #[test]
    fn text_formatting() {
        assert_eq!(format_clock(900), "15:00");
        assert_eq!(format_clock(61), "01:01");
        let history = vec!["e4".to_string(), "e5".to_string(), "Nf3".to_string()];
        assert_eq!(format_history(&history), "1. e4 e5  2. Nf3");

        let event = SessionEvent::lifecycle(LifecyclePhase::Paused, GameStatus::Paused, None);
        assert!(format_event(&event).contains("Paused (paused)"));
    }
}
