use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{GambitError, Result};

/// Opponent strength tier. Each tier also carries its own clock budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub const ALL: [SkillLevel; 3] = [
        SkillLevel::Beginner,
        SkillLevel::Intermediate,
        SkillLevel::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
        }
    }
}

impl Default for SkillLevel {
    fn default() -> Self {
        SkillLevel::Intermediate
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillLevel {
    type Err = GambitError;

    fn from_str(s: &str) -> Result<Self> {
        SkillLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GambitError::Configuration(format!("unknown skill level '{s}'")))
    }
}

/// Per-tier total thinking time, in seconds, granted equally to both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockBudgets {
    pub beginner_secs: u32,
    pub intermediate_secs: u32,
    pub advanced_secs: u32,
}

impl ClockBudgets {
    pub fn for_skill(&self, level: SkillLevel) -> u32 {
        match level {
            SkillLevel::Beginner => self.beginner_secs,
            SkillLevel::Intermediate => self.intermediate_secs,
            SkillLevel::Advanced => self.advanced_secs,
        }
    }
}

impl Default for ClockBudgets {
    fn default() -> Self {
        Self {
            beginner_secs: 30 * 60,
            intermediate_secs: 15 * 60,
            advanced_secs: 5 * 60,
        }
    }
}
