//! SM-2 Spaced Repetition Algorithm
//!
//! SuperMemo 2 update rule driven by a two-button review screen, so only
//! quality 5 (know it) and quality 0 (don't know) ever reach it. The full
//! 0-5 scale is still accepted.

use chrono::{DateTime, Duration, Utc};

use super::models::CardReviewRecord;

/// Minimum ease factor allowed
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor of a card on its first review
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Longest gap between reviews, about a century
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Apply one SM-2 step to `previous` (or a fresh card when `None`) at `now`.
pub fn sm2_update(
    previous: Option<&CardReviewRecord>,
    quality: u8,
    now: DateTime<Utc>,
) -> CardReviewRecord {
    let quality = quality.min(5);

    let (ease_factor, interval, repetitions, total_seen) = match previous {
        Some(record) => (
            record.ease_factor,
            record.interval,
            record.repetitions,
            record.total_seen,
        ),
        None => (DEFAULT_EASE_FACTOR, 0, 0, 0),
    };

    let (interval, repetitions) = if quality >= 3 {
        let interval = match repetitions {
            0 => 1,
            1 => 6,
            _ => (f64::from(interval) * ease_factor)
                .round()
                .min(f64::from(MAX_INTERVAL_DAYS)) as u32,
        };
        (interval, repetitions + 1)
    } else {
        (1, 0)
    };

    // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
    let miss = f64::from(5 - quality);
    let ease_factor = (ease_factor + 0.1 - miss * (0.08 + miss * 0.02)).max(MIN_EASE_FACTOR);

    CardReviewRecord {
        ease_factor,
        interval,
        repetitions,
        next_review: now
            .checked_add_signed(Duration::days(i64::from(interval)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
        last_seen: now,
        total_seen: total_seen.saturating_add(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_first_review_correct() {
        let result = sm2_update(None, 5, now());

        assert_eq!(result.interval, 1);
        assert_eq!(result.repetitions, 1);
        assert_eq!(result.total_seen, 1);
        assert!((result.ease_factor - 2.6).abs() < 1e-9);
        assert_eq!(result.next_review, now() + Duration::days(1));
        assert_eq!(result.last_seen, now());
    }

    #[test]
    fn test_three_correct_reviews() {
        let first = sm2_update(None, 5, now());
        let second = sm2_update(Some(&first), 5, now());
        let third = sm2_update(Some(&second), 5, now());

        assert_eq!(
            [first.interval, second.interval, third.interval],
            [1, 6, 16]
        );
        assert!(second.ease_factor > first.ease_factor);
        assert!(third.ease_factor > second.ease_factor);
        assert_eq!(third.repetitions, 3);
        assert_eq!(third.total_seen, 3);
    }

    #[test]
    fn test_incorrect_resets() {
        let first = sm2_update(None, 5, now());
        let second = sm2_update(Some(&first), 5, now());
        let failed = sm2_update(Some(&second), 0, now());

        assert_eq!(failed.repetitions, 0);
        assert_eq!(failed.interval, 1);
        assert!(failed.ease_factor < second.ease_factor);
        assert!((failed.ease_factor - (second.ease_factor - 0.8)).abs() < 1e-9);
    }

    #[test]
    fn test_ease_factor_minimum() {
        let mut record = sm2_update(None, 0, now());
        for _ in 0..5 {
            record = sm2_update(Some(&record), 0, now());
        }

        assert_eq!(record.ease_factor, MIN_EASE_FACTOR);
        assert_eq!(record.total_seen, 6);
    }

    #[test]
    fn test_long_know_streak_caps_interval() {
        let mut record = sm2_update(None, 5, now());
        for _ in 1..30 {
            record = sm2_update(Some(&record), 5, now());
        }

        assert_eq!(record.repetitions, 30);
        assert_eq!(record.interval, MAX_INTERVAL_DAYS);
        assert_eq!(
            record.next_review,
            now() + Duration::days(i64::from(MAX_INTERVAL_DAYS))
        );

        let again = sm2_update(Some(&record), 5, now());
        assert_eq!(again.interval, MAX_INTERVAL_DAYS);
    }

    #[test]
    fn test_quality_above_scale_is_clamped() {
        let clamped = sm2_update(None, 9, now());
        let perfect = sm2_update(None, 5, now());
        assert_eq!(clamped, perfect);
    }
}
