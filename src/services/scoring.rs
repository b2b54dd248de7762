//! Answer scoring. Pure and total: every input yields a score.

/// Highest number of points a single response can earn.
pub const MAX_POINTS_PER_QUESTION: u32 = 20;

/// Points awarded for a correct answer, by minimum seconds remaining.
const POINT_THRESHOLDS: [(f64, u32); 4] = [(20.0, 20), (15.0, 15), (10.0, 10), (5.0, 5)];

/// Floor for correct answers submitted with any time left at all.
const LAST_SECOND_POINTS: u32 = 1;

/// Outcome of scoring one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    /// Whether the submitted answer matched the correct one.
    pub is_correct: bool,
    /// Points awarded; always zero for incorrect answers.
    pub points: u32,
}

/// Compare answers ignoring case and surrounding whitespace.
pub fn is_correct_answer(submitted: &str, correct: &str) -> bool {
    submitted.trim().to_lowercase() == correct.trim().to_lowercase()
}

/// Map the seconds left on the countdown to a point value for a correct answer.
pub fn points_for_time_remaining(time_remaining_secs: Option<f64>) -> u32 {
    let Some(remaining) = time_remaining_secs.filter(|secs| *secs > 0.0) else {
        return 0;
    };

    POINT_THRESHOLDS
        .iter()
        .find(|(threshold, _)| remaining >= *threshold)
        .map(|(_, points)| *points)
        .unwrap_or(LAST_SECOND_POINTS)
}

/// Score a submission against the question's correct answer.
pub fn score_answer(submitted: &str, correct: &str, time_remaining_secs: Option<f64>) -> Score {
    let is_correct = is_correct_answer(submitted, correct);
    let points = if is_correct {
        points_for_time_remaining(time_remaining_secs)
    } else {
        0
    };

    Score { is_correct, points }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_answer_with_plenty_of_time_scores_max() {
        assert_eq!(
            score_answer("Paris", "Paris", Some(22.0)),
            Score {
                is_correct: true,
                points: 20
            }
        );
    }

    #[test]
    fn correct_answer_with_seven_seconds_scores_five() {
        assert_eq!(
            score_answer("paris", "Paris", Some(7.0)),
            Score {
                is_correct: true,
                points: 5
            }
        );
    }

    #[test]
    fn incorrect_answer_scores_nothing() {
        assert_eq!(
            score_answer("Lyon", "Paris", Some(25.0)),
            Score {
                is_correct: false,
                points: 0
            }
        );
    }

    #[test]
    fn comparison_ignores_case_and_surrounding_whitespace() {
        assert!(is_correct_answer("  tRuE \n", "True"));
        assert!(is_correct_answer("New York", " new york"));
        assert!(!is_correct_answer("NewYork", "New York"));
        assert!(!is_correct_answer("", "False"));
    }

    #[test]
    fn missing_or_exhausted_time_scores_zero_even_when_correct() {
        for remaining in [None, Some(0.0), Some(-3.0)] {
            let score = score_answer("A", "a", remaining);
            assert!(score.is_correct);
            assert_eq!(score.points, 0, "remaining = {remaining:?}");
        }
    }

    #[test]
    fn threshold_boundaries() {
        let cases = [
            (30.0, 20),
            (20.0, 20),
            (19.9, 15),
            (15.0, 15),
            (14.5, 10),
            (10.0, 10),
            (9.99, 5),
            (5.0, 5),
            (4.9, 1),
            (0.1, 1),
        ];
        for (remaining, expected) in cases {
            assert_eq!(
                points_for_time_remaining(Some(remaining)),
                expected,
                "remaining = {remaining}"
            );
        }
    }

    #[test]
    fn points_never_increase_as_time_runs_out() {
        let mut previous = u32::MAX;
        let mut remaining = 40.0;
        while remaining > -2.0 {
            let points = score_answer("x", "X", Some(remaining)).points;
            assert!(points <= previous, "points rose at {remaining}");
            assert!(points <= MAX_POINTS_PER_QUESTION);
            previous = points;
            remaining -= 0.25;
        }
        assert_eq!(previous, 0);
    }
}
