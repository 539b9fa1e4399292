mod ui;

use std::{env, path::PathBuf, sync::mpsc, thread};

use anyhow::{anyhow, Result};
use clap::Parser;
use futures::StreamExt;
use gambit_engine::{Strategy, StrategyOpponent};
use gambit_feed::LocalFeed;
use gambit_ops::{init_tracing, EventJournal};
use gambit_session::{RuntimeTiming, Session, SessionRuntime};
use gambit_types::{board::PieceColor, config::GambitConfig, time_control::SkillLevel};
use tokio::sync::mpsc::unbounded_channel;
use tracing::{info, warn};

use crate::ui::{Command, UiMessage};

const DEFAULT_CONFIG: &str = "configs/dev.toml";
const DEFAULT_LOG_FILE: &str = "logs/gambit-cli.log";

/// Terminal chess against the computer.
#[derive(Debug, Parser)]
#[command(name = "gambit", version)]
struct Args {
    /// Config file; falls back to $GAMBIT_CONFIG, then configs/dev.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Colour you play (white or black).
    #[arg(long)]
    color: Option<PieceColor>,
    /// Opponent tier (beginner, intermediate or advanced).
    #[arg(long)]
    skill: Option<SkillLevel>,
    /// Opponent strategy by name; unknown names play at random.
    #[arg(long)]
    opponent: Option<String>,
    /// Write the event journal here as JSON lines on exit.
    #[arg(long)]
    journal_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(&args);
    // stderr belongs to the full-screen UI.
    if config.ops.log_file.is_none() {
        config.ops.log_file = Some(DEFAULT_LOG_FILE.into());
    }
    init_tracing(&config.ops)?;

    let strategy = config
        .session
        .opponent
        .as_deref()
        .map_or(Strategy::from(config.session.skill_level), Strategy::from_name);
    let opponent = StrategyOpponent::new(strategy);
    let session = Session::new(&config, Box::new(opponent));
    let runtime = SessionRuntime::new(
        session,
        LocalFeed::new(config.feed.capacity),
        EventJournal::new(config.ops.journal_capacity),
        RuntimeTiming::from(&config.session),
    );
    info!(
        color = config.session.user_color.name(),
        skill = %config.session.skill_level,
        strategy = strategy.name(),
        "gambit session ready"
    );

    let (ui_tx, ui_rx) = mpsc::channel();
    let (command_tx, mut command_rx) = unbounded_channel();
    let summary = format!(
        "square {:.2} | reply {} ms",
        config.board.square_size, config.session.reply_delay_ms
    );
    let ui_handle = thread::spawn(move || ui::run(ui_rx, command_tx, summary));

    let mut events = runtime.subscribe();
    runtime.refresh().await?;

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if ui_tx.send(UiMessage::Event(event)).is_err() {
                    break;
                }
            }
            command = command_rx.recv() => match command {
                Some(Command::Quit) | None => break,
                Some(Command::Tip) => {
                    let tip = runtime.tip().await;
                    if ui_tx.send(UiMessage::Hint(tip)).is_err() {
                        break;
                    }
                }
                Some(command) => {
                    if let Err(err) = apply_command(&runtime, command).await {
                        warn!(%err, "command failed");
                    }
                }
            },
        }
    }

    runtime.shutdown();
    let _ = ui_tx.send(UiMessage::Shutdown);
    drop(ui_tx);
    ui_handle
        .join()
        .map_err(|_| anyhow!("terminal UI thread panicked"))??;

    if let Some(path) = args.journal_out {
        let written = runtime.journal().export_json_lines(&path).await?;
        println!("Wrote {written} events to {}", path.display());
    }
    Ok(())
}

async fn apply_command(
    runtime: &SessionRuntime<LocalFeed>,
    command: Command,
) -> gambit_types::Result<()> {
    match command {
        Command::Start => runtime.start().await,
        Command::TogglePause => runtime.toggle_pause().await,
        Command::Click { x, z } => runtime.click(x, z).await,
        Command::Hover(point) => runtime.set_highlight(point).await,
        Command::Undo => runtime.undo().await,
        Command::Reset => runtime.reset().await,
        Command::SetColor(color) => runtime.set_user_color(color).await,
        Command::SetSkill(level) => runtime.set_skill_level(level).await,
        Command::Tip | Command::Quit => Ok(()),
    }
}

fn load_config(args: &Args) -> GambitConfig {
    let path = args
        .config
        .clone()
        .or_else(|| env::var("GAMBIT_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    let mut config = match GambitConfig::from_file(&path) {
        Ok(cfg) => match cfg.validate() {
            Ok(()) => cfg,
            Err(err) => {
                eprintln!(
                    "Invalid config in '{}': {err}. Falling back to internal defaults.",
                    path.display()
                );
                GambitConfig::default()
            }
        },
        Err(err) => {
            eprintln!(
                "Failed to load config from '{}': {err}. Falling back to internal defaults.",
                path.display()
            );
            GambitConfig::default()
        }
    };

    if let Some(color) = args.color {
        config.session.user_color = color;
    }
    if let Some(skill) = args.skill {
        config.session.skill_level = skill;
    }
    if let Some(opponent) = &args.opponent {
        config.session.opponent = Some(opponent.clone());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_the_loaded_config() {
        let args = Args::parse_from([
            "gambit",
            "--config",
            "/nonexistent/gambit.toml",
            "--color",
            "black",
            "--skill",
            "advanced",
        ]);
        let config = load_config(&args);
        assert_eq!(config.session.user_color, PieceColor::Black);
        assert_eq!(config.session.skill_level, SkillLevel::Advanced);
        assert_eq!(config.feed.capacity, GambitConfig::default().feed.capacity);
    }

    #[test]
    fn unknown_skill_is_rejected_by_the_parser() {
        assert!(Args::try_parse_from(["gambit", "--skill", "grandmaster"]).is_err());
    }

    #[test]
    fn opponent_flag_accepts_any_name() {
        let args = Args::parse_from([
            "gambit",
            "--config",
            "/nonexistent/gambit.toml",
            "--opponent",
            "grandmaster",
        ]);
        let config = load_config(&args);
        assert_eq!(config.session.opponent.as_deref(), Some("grandmaster"));
        assert_eq!(
            Strategy::from_name(config.session.opponent.as_deref().unwrap_or_default()),
            Strategy::Random
        );
    }
}
