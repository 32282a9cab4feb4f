//! Spaced repetition for flashcards
//!
//! This module provides:
//! - SM-2 retention updates with binary know / don't-know grading
//! - Due-card selection for review sessions
//! - Per-card review records persisted as a single blob

pub mod algorithm;
pub mod models;
pub mod scheduler;

pub use models::*;
pub use scheduler::{Scheduler, SRS_STORAGE_KEY};
