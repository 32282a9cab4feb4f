//! Tunable reward tables and scheduler settings.
//!
//! Loaded from an optional TOML file; every field falls back to the course
//! defaults so a partial file only overrides what it names.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// XP amounts handed out by the progression engine and the session layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
    /// Base reward for finishing a lesson
    pub complete_lesson: u32,
    /// Extra reward when a lesson is finished with a score of 100
    pub perfect_score_bonus: u32,
    /// Share of the lesson reward granted for repeat completions, in percent
    pub repeat_completion_percent: u32,
    /// Streak bonus per consecutive day
    pub streak_bonus_per_day: u32,
    /// Streak length after which the bonus stops growing
    pub streak_bonus_cap_days: u32,
    /// Reward for each card answered "know" in a review session
    pub review_known: u32,
    /// Bonus for a review session without a single miss
    pub review_perfect_bonus: u32,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            complete_lesson: 20,
            perfect_score_bonus: 50,
            repeat_completion_percent: 30,
            streak_bonus_per_day: 5,
            streak_bonus_cap_days: 7,
            review_known: 5,
            review_perfect_bonus: 25,
        }
    }
}

impl Rewards {
    /// Standard `xp_earned` for finishing a lesson with `score`.
    pub fn lesson_reward(&self, score: u8) -> u32 {
        if score >= 100 {
            self.complete_lesson + self.perfect_score_bonus
        } else {
            self.complete_lesson
        }
    }

    /// XP for completing an already-completed lesson again.
    pub fn repeat_reward(&self, xp_earned: u32) -> u32 {
        (u64::from(xp_earned) * u64::from(self.repeat_completion_percent) / 100) as u32
    }

    /// Daily login bonus for a streak of `streak` days.
    pub fn streak_bonus(&self, streak: u32) -> u32 {
        streak
            .min(self.streak_bonus_cap_days)
            .saturating_mul(self.streak_bonus_per_day)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum cards presented in one review session
    pub session_size: usize,
    /// Consecutive successful recalls after which a card counts as mastered
    pub mastery_repetitions: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            session_size: 20,
            mastery_repetitions: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnlockConfig {
    /// Fraction of the previous module that must be completed to open the next one
    pub module_threshold: f64,
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            module_threshold: 0.8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Overrides the default data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub rewards: Rewards,
    pub scheduler: SchedulerConfig,
    pub unlock: UnlockConfig,
}

impl CoreConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.unlock.module_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "unlock.module_threshold must be between 0 and 1, got {}",
                threshold
            )));
        }
        if self.rewards.repeat_completion_percent > 100 {
            return Err(ConfigError::Invalid(
                "rewards.repeat_completion_percent must not exceed 100".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lesson_reward() {
        let rewards = Rewards::default();
        assert_eq!(rewards.lesson_reward(80), 20);
        assert_eq!(rewards.lesson_reward(100), 70);
    }

    #[test]
    fn test_repeat_reward_floors() {
        let rewards = Rewards::default();
        assert_eq!(rewards.repeat_reward(20), 6);
        assert_eq!(rewards.repeat_reward(70), 21);
        assert_eq!(rewards.repeat_reward(5), 1);
        assert_eq!(rewards.repeat_reward(3), 0);
    }

    #[test]
    fn test_streak_bonus_capped() {
        let rewards = Rewards::default();
        assert_eq!(rewards.streak_bonus(1), 5);
        assert_eq!(rewards.streak_bonus(7), 35);
        assert_eq!(rewards.streak_bonus(30), 35);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CoreConfig::from_toml_str(
            r#"
            [rewards]
            complete_lesson = 40

            [scheduler]
            session_size = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.rewards.complete_lesson, 40);
        assert_eq!(config.rewards.perfect_score_bonus, 50);
        assert_eq!(config.scheduler.session_size, 10);
        assert_eq!(config.scheduler.mastery_repetitions, 3);
        assert_eq!(config.unlock.module_threshold, 0.8);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let result = CoreConfig::from_toml_str("[unlock]\nmodule_threshold = 1.5\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = CoreConfig::load(&temp_dir.path().join("n5lab.toml")).unwrap();
        assert_eq!(config, CoreConfig::default());
    }
}
