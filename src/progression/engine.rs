//! Progression service: owns the learner profile and its persistence.

use super::curriculum::Curriculum;
use super::levels;
use super::models::*;
use super::reducer::{reduce, ActionContext, ProgressAction};
use super::transfer::{parse_import, parse_stored, ExportBundle, ImportError, ImportSummary};
use crate::clock::Clock;
use crate::config::{Rewards, UnlockConfig};
use crate::storage::{KeyValueStore, StorageError};

/// Storage key of the learner profile
pub const PROGRESS_STORAGE_KEY: &str = "n5lab_progress_v1";

type Result<T> = std::result::Result<T, StorageError>;

pub struct Progression {
    profile: LearnerProfile,
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    rewards: Rewards,
    unlock: UnlockConfig,
}

impl Progression {
    /// Create the engine and hydrate the profile from `store`.
    ///
    /// A missing, unreadable, or wrong-version blob leaves the learner on a
    /// fresh profile; the cause is logged.
    pub fn load(
        store: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
        rewards: Rewards,
        unlock: UnlockConfig,
    ) -> Self {
        let stored = match store.get(PROGRESS_STORAGE_KEY) {
            Ok(Some(raw)) => parse_stored(&raw),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Failed to load progress: {}", e);
                None
            }
        };
        let profile = stored.unwrap_or_else(|| LearnerProfile::new(clock.now()));

        Self {
            profile,
            store,
            clock,
            rewards,
            unlock,
        }
    }

    pub fn profile(&self) -> &LearnerProfile {
        &self.profile
    }

    pub fn rewards(&self) -> &Rewards {
        &self.rewards
    }

    /// Apply an action and persist the result when it changed anything.
    ///
    /// The in-memory profile is updated even when the write fails.
    pub fn dispatch(&mut self, action: ProgressAction) -> Result<()> {
        let ctx = ActionContext {
            now: self.clock.now(),
            today: self.clock.today(),
            yesterday: self.clock.yesterday(),
            rewards: &self.rewards,
        };
        log::debug!("Progress action: {:?}", action);

        let next = reduce(&self.profile, action, &ctx);
        if next == self.profile {
            return Ok(());
        }
        self.profile = next;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let result = serde_json::to_string(&self.profile)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(PROGRESS_STORAGE_KEY, &json));

        if let Err(e) = &result {
            log::warn!("Failed to save progress: {}", e);
        }
        result
    }

    // ==================== Commands ====================

    /// Record a finished lesson. Repeat completions earn a reduced share of `xp_earned`.
    pub fn complete_lesson(&mut self, lesson_id: &str, score: u8, xp_earned: u32) -> Result<()> {
        self.dispatch(ProgressAction::CompleteLesson {
            lesson_id: lesson_id.to_string(),
            score,
            xp_earned,
        })
    }

    /// Record a finished lesson with the standard reward for `score`
    pub fn finish_lesson(&mut self, lesson_id: &str, score: u8) -> Result<()> {
        let xp_earned = self.rewards.lesson_reward(score);
        self.complete_lesson(lesson_id, score, xp_earned)
    }

    pub fn award_xp(&mut self, amount: u32) -> Result<()> {
        self.dispatch(ProgressAction::AwardXp { amount })
    }

    /// Daily check-in; safe to call on every start.
    pub fn update_streak(&mut self) -> Result<()> {
        self.dispatch(ProgressAction::UpdateStreak)
    }

    pub fn unlock_achievement(&mut self, achievement_id: &str) -> Result<()> {
        self.dispatch(ProgressAction::UnlockAchievement {
            achievement_id: achievement_id.to_string(),
        })
    }

    pub fn set_study_mode(&mut self, mode: StudyMode) -> Result<()> {
        self.dispatch(ProgressAction::SetStudyMode { mode })
    }

    /// Erase all progress. Callers confirm with the learner first.
    pub fn reset_progress(&mut self) -> Result<()> {
        log::info!("Resetting learner progress");
        self.dispatch(ProgressAction::ResetProgress)
    }

    // ==================== Derived values ====================

    pub fn level(&self) -> u32 {
        levels::level_from_xp(self.profile.xp)
    }

    pub fn level_progress(&self) -> f64 {
        levels::level_progress(self.profile.xp)
    }

    pub fn xp_for_next_level(&self) -> u32 {
        levels::xp_for_next_level(self.level())
    }

    pub fn is_lesson_unlocked(
        &self,
        curriculum: &Curriculum,
        module_id: &str,
        lesson_id: &str,
    ) -> bool {
        curriculum.is_lesson_unlocked(
            &self.profile.completed_lessons,
            module_id,
            lesson_id,
            self.unlock.module_threshold,
        )
    }

    /// Unlock check that honours the study mode: open mode reaches every lesson.
    pub fn is_lesson_accessible(
        &self,
        curriculum: &Curriculum,
        module_id: &str,
        lesson_id: &str,
    ) -> bool {
        match self.profile.study_mode {
            StudyMode::Open => true,
            StudyMode::Guided => self.is_lesson_unlocked(curriculum, module_id, lesson_id),
        }
    }

    pub fn module_progress(&self, curriculum: &Curriculum, module_id: &str) -> f64 {
        curriculum.module_progress(&self.profile.completed_lessons, module_id)
    }

    /// Completed lessons over all lessons in `curriculum`
    pub fn completion_rate(&self, curriculum: &Curriculum) -> f64 {
        let total = curriculum.total_lessons();
        if total == 0 {
            return 0.0;
        }
        self.profile.completed_lessons.len() as f64 / total as f64
    }

    // ==================== Export / Import ====================

    pub fn export(&self) -> ExportBundle {
        ExportBundle::new(self.profile.clone(), self.clock.now())
    }

    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.export())
    }

    /// Replace the whole profile with an exported one.
    ///
    /// Invalid payloads are rejected without touching the current profile. A
    /// failed write after a valid import is logged and reported in the summary.
    pub fn import_json(&mut self, raw: &str) -> std::result::Result<ImportSummary, ImportError> {
        let profile = parse_import(raw, self.clock.now()).map_err(|e| {
            log::error!("Import failed: {}", e);
            e
        })?;

        let xp = profile.xp;
        let completed_lessons = profile.completed_lessons.len();
        let persisted = self
            .dispatch(ProgressAction::Replace {
                profile: Box::new(profile),
            })
            .is_ok();
        log::info!(
            "Imported progress: {} xp, {} completed lessons",
            xp,
            completed_lessons
        );

        Ok(ImportSummary {
            xp,
            completed_lessons,
            persisted,
        })
    }
}
