//! Skill scoring from solved-question history

use types::request::QuestionStats;

/// Weight of a solved easy question
pub const EASY_WEIGHT: u64 = 1;
/// Weight of a solved medium question
pub const MEDIUM_WEIGHT: u64 = 3;
/// Weight of a solved hard question
pub const HARD_WEIGHT: u64 = 5;

/// Weighted sum of solved questions: easy×1 + medium×3 + hard×5
pub fn score(stats: &QuestionStats) -> u64 {
    u64::from(stats.easy) * EASY_WEIGHT
        + u64::from(stats.medium) * MEDIUM_WEIGHT
        + u64::from(stats.hard) * HARD_WEIGHT
}

/// Absolute difference between two skill scores
pub fn difference(s1: u64, s2: u64) -> u64 {
    s1.abs_diff(s2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_weights() {
        assert_eq!(score(&QuestionStats::new(2, 0, 0)), 2);
        assert_eq!(score(&QuestionStats::new(1, 1, 1)), 9);
        assert_eq!(score(&QuestionStats::new(0, 0, 10)), 50);
    }

    #[test]
    fn test_score_default_is_zero() {
        assert_eq!(score(&QuestionStats::default()), 0);
    }

    #[test]
    fn test_score_no_overflow_at_max_counts() {
        let stats = QuestionStats::new(u32::MAX, u32::MAX, u32::MAX);
        assert_eq!(score(&stats), u64::from(u32::MAX) * 9);
    }

    #[test]
    fn test_difference_symmetric() {
        assert_eq!(difference(2, 50), 48);
        assert_eq!(difference(50, 2), 48);
        assert_eq!(difference(7, 7), 0);
    }
}
