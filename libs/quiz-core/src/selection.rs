//! Question selection and option shuffling for test building.

use rand::seq::SliceRandom;
use rand::Rng;

/// Pick up to `count` question ids for a new test.
///
/// Questions that are due for review or never attempted are preferred;
/// remaining slots are filled by random sampling from the previously-seen
/// pool without replacement. When the category is exhausted the plan is
/// simply shorter than `count`.
pub fn plan_test<R: Rng>(
    mut due_or_new: Vec<i64>,
    mut previously_seen: Vec<i64>,
    count: usize,
    rng: &mut R,
) -> Vec<i64> {
    due_or_new.shuffle(rng);
    let mut picked: Vec<i64> = due_or_new.into_iter().take(count).collect();
    if picked.len() < count {
        previously_seen.shuffle(rng);
        let remaining = count - picked.len();
        picked.extend(previously_seen.into_iter().take(remaining));
    }
    picked
}

/// Uniform random permutation of the correct answer and its distractors.
///
/// Computed once per test question at creation time; the result is
/// persisted as the display order, so the same question shows a different
/// option order across tests.
pub fn shuffle_options<R: Rng>(correct_answer: &str, wrong_answers: &[String], rng: &mut R) -> Vec<String> {
    let mut options = Vec::with_capacity(wrong_answers.len() + 1);
    options.push(correct_answer.to_string());
    options.extend(wrong_answers.iter().cloned());
    options.shuffle(rng);
    options
}
