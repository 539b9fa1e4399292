//! Operational helpers: logging setup and the in-memory event journal.

use std::{
    collections::VecDeque,
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use gambit_types::{config::OpsConfig, events::SessionEvent, GambitError, Result};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. With `log_file` set, output goes there
/// without ANSI colours so a full-screen terminal UI stays intact.
pub fn init_tracing(config: &OpsConfig) -> Result<()> {
    let filter = EnvFilter::try_new(config.log_level.clone())
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| GambitError::Ops(format!("failed to create log filter: {err}")))?;

    let installed = match &config.log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .try_init()
        }
        None => fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    installed.map_err(|err| GambitError::Ops(format!("tracing init error: {err}")))?;
    Ok(())
}

fn open_log_file(path: &str) -> Result<File> {
    ensure_parent_dir(Path::new(path))?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| GambitError::Ops(format!("failed to open log file {path}: {err}")))
}

pub fn ensure_parent_dir(path: &Path) -> Result<Option<PathBuf>> {
    let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) else {
        return Ok(None);
    };
    fs::create_dir_all(dir).map_err(|err| {
        GambitError::Ops(format!("failed to create directory {}: {err}", dir.display()))
    })?;
    Ok(Some(dir.to_path_buf()))
}

/// Bounded in-memory record of recent session events. Oldest entries are
/// evicted once `capacity` is reached.
#[derive(Clone)]
pub struct EventJournal {
    events: Arc<Mutex<VecDeque<SessionEvent>>>,
    capacity: usize,
}

impl EventJournal {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn record_event(&self, event: SessionEvent) -> Result<()> {
        let mut events = self.events.lock().await;
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
        Ok(())
    }

    pub async fn snapshot_events(&self) -> Vec<SessionEvent> {
        self.events.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.lock().await.is_empty()
    }

    /// Writes the journal as one JSON object per line. Returns the number of
    /// events written.
    pub async fn export_json_lines(&self, path: &Path) -> Result<usize> {
        let events = self.snapshot_events().await;
        ensure_parent_dir(path)?;
        let file = File::create(path).map_err(|err| {
            GambitError::Ops(format!("failed to create {}: {err}", path.display()))
        })?;
        let mut out = BufWriter::new(file);
        for event in &events {
            let line = serde_json::to_string(event)
                .map_err(|err| GambitError::Ops(format!("failed to encode event: {err}")))?;
            writeln!(out, "{line}")
                .map_err(|err| GambitError::Ops(format!("failed to write event: {err}")))?;
        }
        out.flush()
            .map_err(|err| GambitError::Ops(format!("failed to flush journal: {err}")))?;
        info!(count = events.len(), path = %path.display(), "event journal exported");
        Ok(events.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_types::{events::LifecyclePhase, game::GameStatus};

    fn event(phase: LifecyclePhase) -> SessionEvent {
        SessionEvent::lifecycle(phase, GameStatus::Ongoing, None)
    }

    #[tokio::test]
    async fn journal_keeps_most_recent_events() {
        let journal = EventJournal::new(2);
        assert!(journal.is_empty().await);
        journal.record_event(event(LifecyclePhase::Started)).await.expect("record");
        journal.record_event(event(LifecyclePhase::Paused)).await.expect("record");
        let newest = event(LifecyclePhase::Resumed);
        let newest_id = newest.id;
        journal.record_event(newest).await.expect("record");

        let events = journal.snapshot_events().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].id, newest_id);
        assert_eq!(journal.capacity(), 2);
    }

    #[tokio::test]
    async fn journal_exports_json_lines() {
        let journal = EventJournal::new(8);
        journal.record_event(event(LifecyclePhase::Started)).await.expect("record");
        journal.record_event(event(LifecyclePhase::GameOver)).await.expect("record");

        let path = std::env::temp_dir()
            .join("gambit-ops-test")
            .join("journal.jsonl");
        let written = journal.export_json_lines(&path).await.expect("export");
        assert_eq!(written, 2);

        let contents = fs::read_to_string(&path).expect("read export");
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(first["kind"], "Lifecycle");
        fs::remove_file(&path).expect("cleanup export");
    }

    #[test]
    fn parent_dir_is_optional() {
        assert!(ensure_parent_dir(Path::new("gambit.log"))
            .expect("bare file name")
            .is_none());
    }
}
