//! Level table

/// XP required to reach each level; index 0 is level 1.
pub const LEVEL_THRESHOLDS: [u32; 21] = [
    0, 100, 250, 450, 700, 1000, 1350, 1750, 2200, 2700, 3300, 4000, 4800, 5700, 6700, 7800, 9000,
    10300, 11700, 13200, 15000,
];

pub const MAX_LEVEL: u32 = LEVEL_THRESHOLDS.len() as u32;

/// Highest level whose threshold `xp` has reached
pub fn level_from_xp(xp: u32) -> u32 {
    let reached = LEVEL_THRESHOLDS.iter().take_while(|&&t| xp >= t).count() as u32;
    reached.clamp(1, MAX_LEVEL)
}

/// XP needed to reach the level after `level`; the top threshold at max level
pub fn xp_for_next_level(level: u32) -> u32 {
    let top = LEVEL_THRESHOLDS[LEVEL_THRESHOLDS.len() - 1];
    if level >= MAX_LEVEL {
        return top;
    }
    LEVEL_THRESHOLDS
        .get(level as usize)
        .copied()
        .unwrap_or(top)
}

/// Position of `xp` between the current and the next level threshold, 0..=1
pub fn level_progress(xp: u32) -> f64 {
    let level = level_from_xp(xp);
    if level >= MAX_LEVEL {
        return 1.0;
    }

    let current = LEVEL_THRESHOLDS[(level - 1) as usize];
    let next = LEVEL_THRESHOLDS[level as usize];
    f64::from(xp - current) / f64::from(next - current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bounds() {
        assert_eq!(level_from_xp(0), 1);
        assert_eq!(level_from_xp(99), 1);
        assert_eq!(level_from_xp(100), 2);
        assert_eq!(level_from_xp(15_000), MAX_LEVEL);
        assert_eq!(level_from_xp(u32::MAX), MAX_LEVEL);
    }

    #[test]
    fn test_level_monotonic() {
        let mut previous = level_from_xp(0);
        for xp in (0..16_000).step_by(7) {
            let level = level_from_xp(xp);
            assert!(level >= previous, "level dropped at {} xp", xp);
            previous = level;
        }
    }

    #[test]
    fn test_level_progress() {
        assert_eq!(level_progress(0), 0.0);
        assert_eq!(level_progress(50), 0.5);
        assert_eq!(level_progress(175), 0.5);
        assert_eq!(level_progress(15_000), 1.0);
        assert_eq!(level_progress(20_000), 1.0);

        for xp in (0..15_000).step_by(13) {
            let p = level_progress(xp);
            assert!((0.0..1.0).contains(&p), "{} xp gave {}", xp, p);
        }
    }

    #[test]
    fn test_xp_for_next_level() {
        assert_eq!(xp_for_next_level(1), 100);
        assert_eq!(xp_for_next_level(2), 250);
        assert_eq!(xp_for_next_level(MAX_LEVEL), 15_000);
    }
}
