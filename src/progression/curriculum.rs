//! Lesson ordering supplied by the content layer, and the unlock rule over it.
//!
//! The core only sees ids: an ordered list of modules, each with an ordered
//! list of lesson ids. Titles and lesson bodies stay with the caller.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::models::LessonId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumModule {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub lessons: Vec<LessonId>,
}

impl CurriculumModule {
    pub fn new(id: impl Into<String>, lessons: Vec<LessonId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            lessons,
        }
    }

    fn completed_count(&self, completed: &BTreeSet<LessonId>) -> usize {
        self.lessons
            .iter()
            .filter(|lesson| completed.contains(*lesson))
            .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curriculum {
    pub modules: Vec<CurriculumModule>,
}

impl Curriculum {
    pub fn new(modules: Vec<CurriculumModule>) -> Self {
        Self { modules }
    }

    pub fn module(&self, module_id: &str) -> Option<&CurriculumModule> {
        self.modules.iter().find(|m| m.id == module_id)
    }

    pub fn total_lessons(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    /// Guided-mode unlock rule.
    ///
    /// The first lesson of the first module is always open. The first lesson of
    /// any later module needs `threshold` of the previous module completed. Every
    /// other lesson needs the lesson before it. Unknown ids are locked.
    pub fn is_lesson_unlocked(
        &self,
        completed: &BTreeSet<LessonId>,
        module_id: &str,
        lesson_id: &str,
        threshold: f64,
    ) -> bool {
        let Some(module_index) = self.modules.iter().position(|m| m.id == module_id) else {
            return false;
        };
        let module = &self.modules[module_index];
        let Some(lesson_index) = module.lessons.iter().position(|l| l == lesson_id) else {
            return false;
        };

        if lesson_index > 0 {
            return completed.contains(&module.lessons[lesson_index - 1]);
        }
        if module_index == 0 {
            return true;
        }

        let previous = &self.modules[module_index - 1];
        if previous.lessons.is_empty() {
            return true;
        }
        let ratio = previous.completed_count(completed) as f64 / previous.lessons.len() as f64;
        ratio >= threshold
    }

    /// Fraction of a module's lessons that are completed; 0 for unknown or empty modules
    pub fn module_progress(&self, completed: &BTreeSet<LessonId>, module_id: &str) -> f64 {
        match self.module(module_id) {
            Some(module) if !module.lessons.is_empty() => {
                module.completed_count(completed) as f64 / module.lessons.len() as f64
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lessons(ids: &[&str]) -> Vec<LessonId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn completed(ids: &[&str]) -> BTreeSet<LessonId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn curriculum() -> Curriculum {
        Curriculum::new(vec![
            CurriculumModule::new("hiragana", lessons(&["h1", "h2", "h3", "h4", "h5"])),
            CurriculumModule::new("katakana", lessons(&["k1", "k2", "k3"])),
        ])
    }

    #[test]
    fn test_first_lesson_always_unlocked() {
        assert!(curriculum().is_lesson_unlocked(&completed(&[]), "hiragana", "h1", 0.8));
    }

    #[test]
    fn test_linear_chain_within_module() {
        let c = curriculum();

        assert!(!c.is_lesson_unlocked(&completed(&[]), "hiragana", "h2", 0.8));
        assert!(c.is_lesson_unlocked(&completed(&["h1"]), "hiragana", "h2", 0.8));
        assert!(!c.is_lesson_unlocked(&completed(&["h1"]), "hiragana", "h3", 0.8));
        // Only the immediate predecessor matters
        assert!(c.is_lesson_unlocked(&completed(&["h2"]), "hiragana", "h3", 0.8));
    }

    #[test]
    fn test_module_gate_at_eighty_percent() {
        let c = curriculum();

        assert!(c.is_lesson_unlocked(&completed(&["h1", "h2", "h3", "h4"]), "katakana", "k1", 0.8));
        assert!(!c.is_lesson_unlocked(&completed(&["h1", "h2", "h3"]), "katakana", "k1", 0.8));
        assert!(c.is_lesson_unlocked(&completed(&["h1", "h3", "h4", "h5"]), "katakana", "k1", 0.8));
    }

    #[test]
    fn test_unknown_ids_locked() {
        let c = curriculum();
        let all = completed(&["h1", "h2", "h3", "h4", "h5"]);

        assert!(!c.is_lesson_unlocked(&all, "kanji", "x1", 0.8));
        assert!(!c.is_lesson_unlocked(&all, "katakana", "h1", 0.8));
    }

    #[test]
    fn test_module_progress() {
        let c = curriculum();
        let done = completed(&["h1", "h2", "k1"]);

        assert_eq!(c.module_progress(&done, "hiragana"), 0.4);
        assert!((c.module_progress(&done, "katakana") - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(c.module_progress(&done, "kanji"), 0.0);
        assert_eq!(c.total_lessons(), 8);
    }
}
