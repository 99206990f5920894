//! Answer grading and test scoring.

/// Grade a submitted answer against the canonical correct answer.
///
/// Comparison is exact and case-sensitive: answer text is canonical from
/// the question bank. A blank or absent submission grades incorrect.
pub fn grade(correct_answer: &str, submitted: Option<&str>) -> bool {
    submitted.is_some_and(|answer| answer == correct_answer)
}

/// Score as a percentage, rounded to one decimal place for display.
pub fn score_percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (correct as f64 / total as f64 * 1000.0).round() / 10.0
}
