use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    board::Square,
    game::{GameSnapshot, GameStatus, Mover},
    telemetry::SearchMetrics,
};

/// High-level event kinds moving from the session to its observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Lifecycle,
    Move,
    EngineDecision,
    Board,
}

/// Immutable event envelope for logging and rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    pub id: Uuid,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    Lifecycle(LifecycleEvent),
    Move(MoveEvent),
    Engine(EngineEvent),
    Board(BoardEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub phase: LifecyclePhase,
    pub status: GameStatus,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LifecyclePhase {
    Started,
    Paused,
    Resumed,
    Reset,
    Undone,
    SettingsChanged,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveEvent {
    pub mover: Mover,
    pub san: String,
    pub from: Square,
    pub to: Square,
    pub commentary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineEvent {
    pub metrics: SearchMetrics,
    pub chosen: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardEvent {
    pub snapshot: GameSnapshot,
}

impl SessionEvent {
    pub fn new(kind: EventKind, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn lifecycle(phase: LifecyclePhase, status: GameStatus, details: Option<String>) -> Self {
        Self::new(
            EventKind::Lifecycle,
            EventPayload::Lifecycle(LifecycleEvent {
                phase,
                status,
                details,
            }),
        )
    }

    pub fn board(snapshot: GameSnapshot) -> Self {
        Self::new(EventKind::Board, EventPayload::Board(BoardEvent { snapshot }))
    }

    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        match &self.payload {
            EventPayload::Board(board) => Some(&board.snapshot),
            _ => None,
        }
    }
}
