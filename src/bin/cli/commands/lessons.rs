use std::path::Path;

use anyhow::Result;
use serde_json::json;

use crate::app::{load_curriculum, App};
use crate::OutputFormat;

pub fn run(app: &App, curriculum_path: &Path, format: &OutputFormat) -> Result<()> {
    let curriculum = load_curriculum(curriculum_path)?;
    let progression = &app.core.progression;
    let profile = progression.profile();

    match format {
        OutputFormat::Json => {
            let modules: Vec<_> = curriculum
                .modules
                .iter()
                .map(|module| {
                    let lessons: Vec<_> = module
                        .lessons
                        .iter()
                        .map(|lesson| {
                            let accessible =
                                progression.is_lesson_accessible(&curriculum, &module.id, lesson);
                            json!({
                                "id": lesson,
                                "completed": profile.is_completed(lesson),
                                "accessible": accessible,
                                "score": profile.lesson_score(lesson).map(|s| s.best_score),
                            })
                        })
                        .collect();
                    json!({
                        "id": module.id,
                        "title": module.title,
                        "progress": progression.module_progress(&curriculum, &module.id),
                        "lessons": lessons,
                    })
                })
                .collect();
            let output = json!({
                "modules": modules,
                "completionRate": progression.completion_rate(&curriculum),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            for module in &curriculum.modules {
                println!(
                    "{} ({:.0}%)",
                    module.title.as_deref().unwrap_or(&module.id),
                    progression.module_progress(&curriculum, &module.id) * 100.0
                );
                for lesson in &module.lessons {
                    let state = if profile.is_completed(lesson) {
                        "done"
                    } else if progression.is_lesson_accessible(&curriculum, &module.id, lesson) {
                        "open"
                    } else {
                        "locked"
                    };
                    match profile.lesson_score(lesson) {
                        Some(score) => {
                            println!("  [{:>6}] {} ({}%)", state, lesson, score.best_score)
                        }
                        None => println!("  [{:>6}] {}", state, lesson),
                    }
                }
            }
            println!(
                "\nOverall: {:.0}% of {} lessons",
                progression.completion_rate(&curriculum) * 100.0,
                curriculum.total_lessons()
            );
        }
    }

    Ok(())
}
