//! Experience, levels, streaks and lesson gating
//!
//! This module provides:
//! - The learner profile and its action reducer
//! - The XP level table
//! - Curriculum unlock rules (linear chain with a soft gate between modules)
//! - Profile export and validated import

pub mod curriculum;
pub mod engine;
pub mod levels;
pub mod models;
pub mod reducer;
pub mod transfer;

pub use curriculum::{Curriculum, CurriculumModule};
pub use engine::{Progression, PROGRESS_STORAGE_KEY};
pub use models::*;
pub use reducer::{reduce, ActionContext, ProgressAction};
pub use transfer::{ExportBundle, ImportError, ImportSummary};
