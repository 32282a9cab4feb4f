//! Progress state transitions
//!
//! Every change to a [`LearnerProfile`] goes through [`reduce`], which builds a
//! new profile from the old one and an action. Time is passed in through
//! [`ActionContext`] so transitions stay deterministic.

use chrono::{DateTime, NaiveDate, Utc};

use super::models::*;
use crate::config::Rewards;

/// Everything a transition may read besides the profile itself
#[derive(Debug, Clone)]
pub struct ActionContext<'a> {
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
    pub yesterday: NaiveDate,
    pub rewards: &'a Rewards,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressAction {
    /// Finish a lesson. `xp_earned` is the full first-completion reward.
    CompleteLesson {
        lesson_id: LessonId,
        score: u8,
        xp_earned: u32,
    },
    AwardXp {
        amount: u32,
    },
    /// Daily check-in, run on every app start
    UpdateStreak,
    UnlockAchievement {
        achievement_id: String,
    },
    SetStudyMode {
        mode: StudyMode,
    },
    ResetProgress,
    /// Replace the whole profile (import)
    Replace {
        profile: Box<LearnerProfile>,
    },
}

pub fn reduce(
    state: &LearnerProfile,
    action: ProgressAction,
    ctx: &ActionContext<'_>,
) -> LearnerProfile {
    match action {
        ProgressAction::CompleteLesson {
            lesson_id,
            score,
            xp_earned,
        } => complete_lesson(state, lesson_id, score.min(100), xp_earned, ctx),

        ProgressAction::AwardXp { amount } => LearnerProfile {
            xp: state.xp.saturating_add(amount),
            last_updated: ctx.now,
            ..state.clone()
        },

        ProgressAction::UpdateStreak => update_streak(state, ctx),

        ProgressAction::UnlockAchievement { achievement_id } => {
            if state.achievements.contains(&achievement_id) {
                return state.clone();
            }
            let mut next = state.clone();
            next.achievements.insert(achievement_id);
            next.last_updated = ctx.now;
            next
        }

        ProgressAction::SetStudyMode { mode } => LearnerProfile {
            study_mode: mode,
            ..state.clone()
        },

        ProgressAction::ResetProgress => LearnerProfile::new(ctx.now),

        ProgressAction::Replace { profile } => *profile,
    }
}

fn complete_lesson(
    state: &LearnerProfile,
    lesson_id: LessonId,
    score: u8,
    xp_earned: u32,
    ctx: &ActionContext<'_>,
) -> LearnerProfile {
    let mut next = state.clone();
    let already_completed = state.is_completed(&lesson_id);

    let reward = if already_completed {
        ctx.rewards.repeat_reward(xp_earned)
    } else {
        xp_earned
    };

    let entry = match state.lesson_score(&lesson_id) {
        Some(existing) => existing.retried(score, ctx.now),
        None => LessonScore::first(score, ctx.now),
    };

    next.xp = next.xp.saturating_add(reward);
    next.lesson_scores.insert(lesson_id.clone(), entry);
    next.completed_lessons.insert(lesson_id);
    next.last_updated = ctx.now;
    next
}

fn update_streak(state: &LearnerProfile, ctx: &ActionContext<'_>) -> LearnerProfile {
    if state.last_active_date == Some(ctx.today) {
        return state.clone();
    }

    let streak = match state.last_active_date {
        Some(last) if last == ctx.yesterday => state.streak.saturating_add(1),
        // Last active day ahead of today: the clock went backwards, keep the streak
        Some(last) if last > ctx.today => state.streak,
        _ => 1,
    };

    let mut next = state.clone();
    next.streak = streak;
    next.longest_streak = state.longest_streak.max(streak);
    next.last_active_date = Some(ctx.today);
    next.active_dates.insert(ctx.today);
    next.xp = next.xp.saturating_add(ctx.rewards.streak_bonus(streak));
    next.last_updated = ctx.now;
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ctx_on(date: NaiveDate, rewards: &Rewards) -> ActionContext<'_> {
        ActionContext {
            now: date.and_hms_opt(8, 0, 0).unwrap().and_utc(),
            today: date,
            yesterday: date - Duration::days(1),
            rewards,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn fresh() -> LearnerProfile {
        LearnerProfile::new(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
    }

    fn complete(lesson: &str, score: u8, xp: u32) -> ProgressAction {
        ProgressAction::CompleteLesson {
            lesson_id: lesson.to_string(),
            score,
            xp_earned: xp,
        }
    }

    #[test]
    fn test_first_and_repeat_completion() {
        let rewards = Rewards::default();
        let ctx = ctx_on(day(1), &rewards);

        let first = reduce(&fresh(), complete("hiragana_k", 80, 20), &ctx);
        assert_eq!(first.xp, 20);
        assert_eq!(first.completed_lessons.len(), 1);
        assert_eq!(first.lesson_score("hiragana_k").unwrap().attempts, 1);

        let repeat = reduce(&first, complete("hiragana_k", 95, 20), &ctx);
        assert_eq!(repeat.xp - first.xp, 6);
        assert_eq!(repeat.completed_lessons.len(), 1);

        let score = repeat.lesson_score("hiragana_k").unwrap();
        assert_eq!(score.attempts, 2);
        assert_eq!(score.best_score, 95);
        assert_eq!(score.last_score, 95);

        let worse = reduce(&repeat, complete("hiragana_k", 40, 20), &ctx);
        let score = worse.lesson_score("hiragana_k").unwrap();
        assert_eq!(score.best_score, 95);
        assert_eq!(score.last_score, 40);
        assert_eq!(score.attempts, 3);
    }

    #[test]
    fn test_score_clamped_to_hundred() {
        let rewards = Rewards::default();
        let ctx = ctx_on(day(1), &rewards);

        let next = reduce(&fresh(), complete("a", 250, 20), &ctx);
        assert_eq!(next.lesson_score("a").unwrap().best_score, 100);
    }

    #[test]
    fn test_award_xp() {
        let rewards = Rewards::default();
        let ctx = ctx_on(day(1), &rewards);

        let next = reduce(&fresh(), ProgressAction::AwardXp { amount: 15 }, &ctx);
        assert_eq!(next.xp, 15);

        let mut maxed = fresh();
        maxed.xp = u32::MAX - 1;
        let next = reduce(&maxed, ProgressAction::AwardXp { amount: 15 }, &ctx);
        assert_eq!(next.xp, u32::MAX);
    }

    #[test]
    fn test_streak_first_login() {
        let rewards = Rewards::default();

        let next = reduce(&fresh(), ProgressAction::UpdateStreak, &ctx_on(day(3), &rewards));

        assert_eq!(next.streak, 1);
        assert_eq!(next.longest_streak, 1);
        assert_eq!(next.last_active_date, Some(day(3)));
        assert!(next.active_dates.contains(&day(3)));
        assert_eq!(next.xp, 5);
    }

    #[test]
    fn test_streak_idempotent_within_day() {
        let rewards = Rewards::default();
        let ctx = ctx_on(day(3), &rewards);

        let once = reduce(&fresh(), ProgressAction::UpdateStreak, &ctx);
        let twice = reduce(&once, ProgressAction::UpdateStreak, &ctx);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_streak_continues_from_yesterday() {
        let rewards = Rewards::default();
        let mut state = fresh();
        state.streak = 4;
        state.longest_streak = 9;
        state.last_active_date = Some(day(2));

        let next = reduce(&state, ProgressAction::UpdateStreak, &ctx_on(day(3), &rewards));

        assert_eq!(next.streak, 5);
        assert_eq!(next.longest_streak, 9);
        assert_eq!(next.xp, 25);
    }

    #[test]
    fn test_streak_resets_after_gap() {
        let rewards = Rewards::default();
        let mut state = fresh();
        state.streak = 12;
        state.longest_streak = 12;
        state.last_active_date = Some(day(1));

        let next = reduce(&state, ProgressAction::UpdateStreak, &ctx_on(day(3), &rewards));

        assert_eq!(next.streak, 1);
        assert_eq!(next.longest_streak, 12);
    }

    #[test]
    fn test_streak_kept_when_last_active_in_future() {
        let rewards = Rewards::default();
        let mut state = fresh();
        state.streak = 3;
        state.longest_streak = 4;
        state.last_active_date = Some(day(10));

        let next = reduce(&state, ProgressAction::UpdateStreak, &ctx_on(day(3), &rewards));
        assert_eq!(next.streak, 3);
        assert_eq!(next.longest_streak, 4);
        assert_eq!(next.last_active_date, Some(day(3)));
        assert!(next.active_dates.contains(&day(3)));
        assert_eq!(next.xp, 15);

        // Back on a normal calendar the streak continues from there
        let after = reduce(&next, ProgressAction::UpdateStreak, &ctx_on(day(4), &rewards));
        assert_eq!(after.streak, 4);
    }

    #[test]
    fn test_streak_bonus_capped_at_seven_days() {
        let rewards = Rewards::default();
        let mut state = fresh();
        state.streak = 20;
        state.longest_streak = 20;
        state.last_active_date = Some(day(2));

        let next = reduce(&state, ProgressAction::UpdateStreak, &ctx_on(day(3), &rewards));

        assert_eq!(next.streak, 21);
        assert_eq!(next.longest_streak, 21);
        assert_eq!(next.xp, 35);
    }

    #[test]
    fn test_achievement_unlocked_once() {
        let rewards = Rewards::default();
        let ctx = ctx_on(day(1), &rewards);
        let unlock = || ProgressAction::UnlockAchievement {
            achievement_id: "first_lesson".to_string(),
        };

        let once = reduce(&fresh(), unlock(), &ctx);
        let twice = reduce(&once, unlock(), &ctx);

        assert_eq!(once.achievements.len(), 1);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_study_mode_and_reset() {
        let rewards = Rewards::default();
        let ctx = ctx_on(day(4), &rewards);

        let open = reduce(&fresh(), ProgressAction::SetStudyMode { mode: StudyMode::Open }, &ctx);
        assert_eq!(open.study_mode, StudyMode::Open);

        let progressed = reduce(&open, complete("a", 100, 70), &ctx);
        let reset = reduce(&progressed, ProgressAction::ResetProgress, &ctx);

        assert_eq!(reset, LearnerProfile::new(ctx.now));
    }
}
