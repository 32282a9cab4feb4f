use anyhow::{bail, Result};
use serde_json::json;

use n5lab_lib::progression::StudyMode;

use crate::app::{warn_unsaved, App};
use crate::OutputFormat;

fn mode_name(mode: StudyMode) -> &'static str {
    match mode {
        StudyMode::Guided => "guided",
        StudyMode::Open => "open",
    }
}

pub fn run_status(app: &App, format: &OutputFormat) -> Result<()> {
    let progression = &app.core.progression;
    let profile = progression.profile();

    match format {
        OutputFormat::Json => {
            let output = json!({
                "xp": profile.xp,
                "level": progression.level(),
                "levelProgress": progression.level_progress(),
                "xpForNextLevel": progression.xp_for_next_level(),
                "streak": profile.streak,
                "longestStreak": profile.longest_streak,
                "completedLessons": profile.completed_lessons.len(),
                "achievements": profile.achievements,
                "studyMode": profile.study_mode,
                "lastActiveDate": profile.last_active_date,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "Level {} ({} XP, {:.0}% to next level at {} XP)",
                progression.level(),
                profile.xp,
                progression.level_progress() * 100.0,
                progression.xp_for_next_level()
            );
            println!(
                "Streak: {} day(s), longest {}",
                profile.streak, profile.longest_streak
            );
            println!("Completed lessons: {}", profile.completed_lessons.len());
            println!("Achievements: {}", profile.achievements.len());
            println!("Study mode: {}", mode_name(profile.study_mode));
        }
    }

    Ok(())
}

pub fn run_complete(
    app: &mut App,
    lesson_id: &str,
    score: u8,
    xp: Option<u32>,
    format: &OutputFormat,
) -> Result<()> {
    if score > 100 {
        bail!("Score must be between 0 and 100");
    }

    let progression = &mut app.core.progression;
    let first_time = !progression.profile().is_completed(lesson_id);
    let xp_before = progression.profile().xp;

    let xp_earned = xp.unwrap_or_else(|| progression.rewards().lesson_reward(score));
    warn_unsaved(progression.complete_lesson(lesson_id, score, xp_earned));

    let profile = progression.profile();
    let gained = profile.xp.saturating_sub(xp_before);
    let best = profile.lesson_score(lesson_id).map(|s| s.best_score);

    match format {
        OutputFormat::Json => {
            let output = json!({
                "lesson": lesson_id,
                "firstCompletion": first_time,
                "xpGained": gained,
                "xp": profile.xp,
                "bestScore": best,
                "level": progression.level(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let kind = if first_time { "Completed" } else { "Repeated" };
            println!("{} {} with {}% (+{} XP)", kind, lesson_id, score, gained);
            if let Some(best) = best {
                println!("Best score: {}%", best);
            }
            println!("Total: {} XP, level {}", profile.xp, progression.level());
        }
    }

    Ok(())
}

pub fn run_award(app: &mut App, amount: u32, format: &OutputFormat) -> Result<()> {
    let progression = &mut app.core.progression;
    let level_before = progression.level();
    warn_unsaved(progression.award_xp(amount));
    let level = progression.level();

    match format {
        OutputFormat::Json => {
            let output = json!({
                "xp": progression.profile().xp,
                "level": level,
                "leveledUp": level > level_before,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("+{} XP (total {})", amount, progression.profile().xp);
            if level > level_before {
                println!("Level up! Now level {}", level);
            }
        }
    }

    Ok(())
}

pub fn run_mode(app: &mut App, mode: StudyMode, format: &OutputFormat) -> Result<()> {
    warn_unsaved(app.core.progression.set_study_mode(mode));

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "studyMode": mode }))?);
        }
        OutputFormat::Plain => {
            println!("Study mode: {}", mode_name(mode));
        }
    }

    Ok(())
}

pub fn run_achieve(app: &mut App, achievement_id: &str, format: &OutputFormat) -> Result<()> {
    let progression = &mut app.core.progression;
    let already = progression.profile().achievements.contains(achievement_id);
    warn_unsaved(progression.unlock_achievement(achievement_id));

    match format {
        OutputFormat::Json => {
            let output = json!({
                "achievement": achievement_id,
                "new": !already,
                "total": progression.profile().achievements.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if already {
                println!("Already unlocked: {}", achievement_id);
            } else {
                println!("Unlocked: {}", achievement_id);
            }
        }
    }

    Ok(())
}

pub fn run_reset(app: &mut App, confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("Resetting erases all progress; pass --yes to confirm");
    }

    warn_unsaved(app.core.progression.reset_progress());
    println!("Progress reset");
    Ok(())
}
