//! Profile backup: export to a JSON file and validated import.
//!
//! Only the learner profile travels; card review records are not part of a backup.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::models::{LearnerProfile, LessonId, LessonScore, StudyMode, PROFILE_VERSION};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Could not parse progress file: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Invalid progress file format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported progress file version: {0}")]
    UnsupportedVersion(String),

    #[error("Malformed progress data: {0}")]
    Malformed(serde_json::Error),
}

/// Exported progress file: the full profile plus export metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    #[serde(flatten)]
    pub profile: LearnerProfile,
    pub exported_at: DateTime<Utc>,
    pub app_version: String,
}

impl ExportBundle {
    pub fn new(profile: LearnerProfile, exported_at: DateTime<Utc>) -> Self {
        Self {
            profile,
            exported_at,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Suggested file name, e.g. `n5lab_progress_2024-05-01.json`
    pub fn file_name(&self) -> String {
        format!("n5lab_progress_{}.json", self.exported_at.format("%Y-%m-%d"))
    }
}

/// What an import brought in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub xp: u32,
    pub completed_lessons: usize,
    /// Whether the imported profile was also written to storage
    pub persisted: bool,
}

/// Backup layout accepted on import. Older backups carry less per-lesson
/// detail and may lack timestamps, so everything past the validated fields is
/// optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackupProfile {
    xp: u32,
    completed_lessons: BTreeSet<LessonId>,
    #[serde(default)]
    lesson_scores: BTreeMap<LessonId, BackupScore>,
    #[serde(default)]
    streak: u32,
    #[serde(default)]
    longest_streak: u32,
    #[serde(default)]
    last_active_date: Option<NaiveDate>,
    #[serde(default)]
    active_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    achievements: BTreeSet<String>,
    #[serde(default)]
    study_mode: StudyMode,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackupScore {
    score: u8,
    #[serde(default)]
    last_score: Option<u8>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    last_attempt_at: Option<DateTime<Utc>>,
    #[serde(default)]
    attempts: Option<u32>,
}

impl BackupScore {
    fn into_score(self, now: DateTime<Utc>) -> LessonScore {
        let best_score = self.score.min(100);
        let completed_at = self.completed_at.unwrap_or(now);
        LessonScore {
            best_score,
            last_score: self.last_score.map_or(best_score, |s| s.min(100)),
            completed_at,
            last_attempt_at: self.last_attempt_at.unwrap_or(completed_at),
            attempts: self.attempts.unwrap_or(1).max(1),
        }
    }
}

impl BackupProfile {
    fn into_profile(self, now: DateTime<Utc>) -> LearnerProfile {
        LearnerProfile {
            xp: self.xp,
            completed_lessons: self.completed_lessons,
            lesson_scores: self
                .lesson_scores
                .into_iter()
                .map(|(id, score)| (id, score.into_score(now)))
                .collect(),
            streak: self.streak,
            longest_streak: self.longest_streak,
            last_active_date: self.last_active_date,
            active_dates: self.active_dates,
            achievements: self.achievements,
            study_mode: self.study_mode,
            created_at: self.created_at.unwrap_or(now),
            last_updated: now,
            version: PROFILE_VERSION,
        }
    }
}

/// Validate an import payload and turn it into a profile stamped with `now`.
pub fn parse_import(raw: &str, now: DateTime<Utc>) -> Result<LearnerProfile, ImportError> {
    let value: Value = serde_json::from_str(raw).map_err(ImportError::InvalidJson)?;

    let Some(object) = value.as_object() else {
        return Err(ImportError::InvalidFormat("expected a JSON object".to_string()));
    };
    if !object.get("xp").map_or(false, Value::is_number) {
        return Err(ImportError::InvalidFormat("xp must be a number".to_string()));
    }
    if !object.get("completedLessons").map_or(false, Value::is_array) {
        return Err(ImportError::InvalidFormat(
            "completedLessons must be an array".to_string(),
        ));
    }
    match object.get("version") {
        Some(v) if v.as_u64() == Some(u64::from(PROFILE_VERSION)) => {}
        Some(v) => return Err(ImportError::UnsupportedVersion(v.to_string())),
        None => return Err(ImportError::UnsupportedVersion("missing".to_string())),
    }

    let backup: BackupProfile = serde_json::from_value(value).map_err(ImportError::Malformed)?;
    Ok(backup.into_profile(now).normalized())
}

/// Read a stored profile blob. Anything that is not a well-formed profile of the
/// current version yields `None`.
pub fn parse_stored(raw: &str) -> Option<LearnerProfile> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Stored progress is not valid JSON: {}", e);
            return None;
        }
    };

    let version = value.get("version").and_then(Value::as_u64);
    if version != Some(u64::from(PROFILE_VERSION)) {
        log::warn!(
            "Ignoring stored progress with schema version {:?} (expected {})",
            version,
            PROFILE_VERSION
        );
        return None;
    }

    match serde_json::from_value::<LearnerProfile>(value) {
        Ok(profile) => Some(profile.normalized()),
        Err(e) => {
            log::warn!("Stored progress is malformed: {}", e);
            None
        }
    }
}
