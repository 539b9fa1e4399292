use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    board::PieceColor,
    time_control::{ClockBudgets, SkillLevel},
    GambitError, Result,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub square_size: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub user_color: PieceColor,
    pub skill_level: SkillLevel,
    /// Opponent strategy by name, overriding the skill level's own until the
    /// level is changed. Unrecognised names play uniformly at random.
    #[serde(default)]
    pub opponent: Option<String>,
    /// Delay before the computer answers a user move.
    pub reply_delay_ms: u64,
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsConfig {
    pub log_level: String,
    /// Log destination; stderr when unset.
    #[serde(default)]
    pub log_file: Option<String>,
    pub journal_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GambitConfig {
    pub board: BoardConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub clocks: ClockBudgets,
    pub ops: OpsConfig,
    pub feed: FeedConfig,
}

impl GambitConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|err| {
            GambitError::Configuration(format!(
                "unable to read config file {}: {err}",
                path_ref.display()
            ))
        })?;
        toml::from_str(&contents).map_err(|err| {
            GambitError::Configuration(format!(
                "failed to parse config file {}: {err}",
                path_ref.display()
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.board.square_size.is_finite() && self.board.square_size > 0.0) {
            return Err(GambitError::Configuration(
                "board.square_size must be a positive number".into(),
            ));
        }
        if self.session.tick_interval_ms == 0 {
            return Err(GambitError::Configuration(
                "session.tick_interval_ms must be greater than zero".into(),
            ));
        }
        for level in SkillLevel::ALL {
            if self.clocks.for_skill(level) == 0 {
                return Err(GambitError::Configuration(format!(
                    "clocks budget for {level} must be greater than zero"
                )));
            }
        }
        if self.ops.journal_capacity == 0 {
            return Err(GambitError::Configuration(
                "ops.journal_capacity must be greater than zero".into(),
            ));
        }
        if self.feed.capacity == 0 {
            return Err(GambitError::Configuration(
                "feed.capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for GambitConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig { square_size: 1.0 },
            session: SessionConfig {
                user_color: PieceColor::White,
                skill_level: SkillLevel::Intermediate,
                opponent: None,
                reply_delay_ms: 500,
                tick_interval_ms: 1000,
            },
            clocks: ClockBudgets::default(),
            ops: OpsConfig {
                log_level: "info".into(),
                log_file: None,
                journal_capacity: 256,
            },
            feed: FeedConfig { capacity: 64 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn load_gambit_config_from_file() {
        let temp_path = std::env::temp_dir().join("gambit-config-test.toml");
        let mut config = GambitConfig::default();
        config.session.user_color = PieceColor::Black;
        config.session.skill_level = SkillLevel::Advanced;
        config.clocks.advanced_secs = 120;
        config.session.opponent = Some("random".into());
        config.ops.log_file = Some("gambit.log".into());

        let doc = toml::to_string(&config).expect("serialize config");
        fs::write(&temp_path, doc).expect("write temp config");

        let loaded = GambitConfig::from_file(&temp_path).expect("load config");
        assert_eq!(loaded.session.user_color, PieceColor::Black);
        assert_eq!(loaded.session.skill_level, SkillLevel::Advanced);
        assert_eq!(loaded.clocks.advanced_secs, 120);
        assert_eq!(loaded.session.opponent.as_deref(), Some("random"));
        assert_eq!(loaded.ops.log_file.as_deref(), Some("gambit.log"));
        fs::remove_file(&temp_path).expect("cleanup temp config");
    }

    #[test]
    fn missing_clock_section_uses_defaults() {
        let doc = r#"
            [board]
            square_size = 1.0

            [session]
            user_color = "white"
            skill_level = "beginner"
            reply_delay_ms = 500
            tick_interval_ms = 1000

            [ops]
            log_level = "debug"
            journal_capacity = 16

            [feed]
            capacity = 8
        "#;
        let config: GambitConfig = toml::from_str(doc).expect("parse config");
        assert_eq!(config.clocks, ClockBudgets::default());
        assert!(config.session.opponent.is_none());
        assert!(config.ops.log_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_configuration_rules() {
        let mut config = GambitConfig::default();
        assert!(config.validate().is_ok());

        config.board.square_size = 0.0;
        assert!(config.validate().is_err());
        config.board.square_size = 1.0;
        config.session.tick_interval_ms = 0;
        assert!(config.validate().is_err());
        config.session.tick_interval_ms = 1000;
        config.clocks.beginner_secs = 0;
        assert!(config.validate().is_err());
        config.clocks.beginner_secs = 1800;
        config.ops.journal_capacity = 0;
        assert!(config.validate().is_err());
        config.ops.journal_capacity = 8;
        config.feed.capacity = 0;
        assert!(config.validate().is_err());
        config.feed.capacity = 8;
        assert!(config.validate().is_ok());
    }
}
