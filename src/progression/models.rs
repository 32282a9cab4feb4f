//! Learner profile data model

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type LessonId = String;

/// Schema version written with every profile. Anything else is rejected.
pub const PROFILE_VERSION: u32 = 1;

/// How the curriculum is browsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyMode {
    /// Lessons open one after another
    #[default]
    Guided,
    /// Every lesson is accessible
    Open,
}

/// Score history of a completed lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonScore {
    /// Best score over all attempts (0-100)
    #[serde(rename = "score")]
    pub best_score: u8,
    pub last_score: u8,
    /// First completion
    pub completed_at: DateTime<Utc>,
    pub last_attempt_at: DateTime<Utc>,
    pub attempts: u32,
}

impl LessonScore {
    pub fn first(score: u8, at: DateTime<Utc>) -> Self {
        Self {
            best_score: score,
            last_score: score,
            completed_at: at,
            last_attempt_at: at,
            attempts: 1,
        }
    }

    /// Record another attempt, keeping the best score
    pub fn retried(&self, score: u8, at: DateTime<Utc>) -> Self {
        Self {
            best_score: self.best_score.max(score),
            last_score: score,
            completed_at: self.completed_at,
            last_attempt_at: at,
            attempts: self.attempts.saturating_add(1),
        }
    }
}

/// Everything the progression engine knows about the learner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    /// Lifetime experience points
    pub xp: u32,
    pub completed_lessons: BTreeSet<LessonId>,
    #[serde(default)]
    pub lesson_scores: BTreeMap<LessonId, LessonScore>,

    /// Consecutive active days ending on `last_active_date`
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub last_active_date: Option<NaiveDate>,
    /// Every day the learner opened the app
    #[serde(default)]
    pub active_dates: BTreeSet<NaiveDate>,

    #[serde(default)]
    pub achievements: BTreeSet<String>,
    #[serde(default)]
    pub study_mode: StudyMode,

    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub version: u32,
}

impl LearnerProfile {
    /// Zero-valued profile for a learner starting at `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            xp: 0,
            completed_lessons: BTreeSet::new(),
            lesson_scores: BTreeMap::new(),
            streak: 0,
            longest_streak: 0,
            last_active_date: None,
            active_dates: BTreeSet::new(),
            achievements: BTreeSet::new(),
            study_mode: StudyMode::Guided,
            created_at: now,
            last_updated: now,
            version: PROFILE_VERSION,
        }
    }

    pub fn is_completed(&self, lesson_id: &str) -> bool {
        self.completed_lessons.contains(lesson_id)
    }

    pub fn lesson_score(&self, lesson_id: &str) -> Option<&LessonScore> {
        self.lesson_scores.get(lesson_id)
    }

    /// Restore `longest_streak >= streak` and the score/completion pairing on
    /// data that did not come from the reducer.
    pub(crate) fn normalized(mut self) -> Self {
        self.longest_streak = self.longest_streak.max(self.streak);

        let completed = &self.completed_lessons;
        self.lesson_scores.retain(|id, _| completed.contains(id));
        for id in &self.completed_lessons {
            if !self.lesson_scores.contains_key(id) {
                let at = self.last_updated;
                self.lesson_scores.insert(id.clone(), LessonScore::first(0, at));
            }
        }
        self
    }
}
