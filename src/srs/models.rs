//! Data models for the spaced repetition scheduler

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Rewards;

pub type CardId = String;

/// Answer given on the "Know it" / "Don't know" buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewOutcome {
    Know,
    DontKnow,
}

impl ReviewOutcome {
    /// SM-2 quality score. Grading is binary: perfect recall or blackout.
    pub fn quality(self) -> u8 {
        match self {
            Self::Know => 5,
            Self::DontKnow => 0,
        }
    }
}

impl fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Know => f.write_str("know"),
            Self::DontKnow => f.write_str("dont-know"),
        }
    }
}

impl FromStr for ReviewOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "know" => Ok(Self::Know),
            "dont-know" => Ok(Self::DontKnow),
            other => Err(format!("unknown review outcome: {}", other)),
        }
    }
}

fn default_ease_factor() -> f64 {
    2.5
}

/// Retention state of a card that has been reviewed at least once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardReviewRecord {
    /// SM-2 ease factor (default 2.5, never below 1.3)
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    /// Days between `last_seen` and `next_review`
    #[serde(default)]
    pub interval: u32,
    /// Consecutive successful recalls
    #[serde(default)]
    pub repetitions: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub next_review: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub total_seen: u32,
}

impl CardReviewRecord {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }

    pub fn is_mastered(&self, mastery_repetitions: u32) -> bool {
        self.repetitions >= mastery_repetitions
    }
}

/// Breakdown of a set of cards by review state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    pub total_cards: usize,
    /// Never reviewed
    pub new_cards: usize,
    /// Reviewed but below the mastery threshold
    pub learning_cards: usize,
    pub mastered_cards: usize,
    /// New cards plus reviewed cards whose next review has passed
    pub due_cards: usize,
}

/// Running count of answers in one review session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTally {
    pub known: u32,
    pub unknown: u32,
}

impl SessionTally {
    pub fn record(&mut self, outcome: ReviewOutcome) {
        match outcome {
            ReviewOutcome::Know => self.known += 1,
            ReviewOutcome::DontKnow => self.unknown += 1,
        }
    }

    pub fn answered(&self) -> u32 {
        self.known + self.unknown
    }

    /// Whether the session earned the no-miss bonus
    pub fn is_perfect(&self) -> bool {
        self.known > 0 && self.unknown == 0
    }

    /// XP earned by the session: per-card reward plus the no-miss bonus
    pub fn xp_earned(&self, rewards: &Rewards) -> u32 {
        let per_card = self.known.saturating_mul(rewards.review_known);
        if self.is_perfect() {
            per_card.saturating_add(rewards.review_perfect_bonus)
        } else {
            per_card
        }
    }
}
