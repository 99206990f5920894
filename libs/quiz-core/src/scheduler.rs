//! Ease/streak spaced repetition scheduler.
//!
//! A question's ease rises by a small bonus on a correct answer and falls
//! by a larger penalty on an incorrect one, clamped to a configured range.
//! The review interval grows geometrically with the consecutive-correct
//! streak: `interval_days = base_interval_days * ease^streak`, capped at
//! `maximum_interval_days` so long streaks stay on the calendar. The
//! streak resets to 0 on any miss, which pulls the question back to the
//! base interval.

use chrono::{DateTime, Duration, Utc};

use crate::types::ReviewState;

/// Scheduler with configurable parameters.
#[derive(Debug, Clone)]
pub struct Scheduler {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub maximum_ease: f64,
    pub correct_bonus: f64,
    pub incorrect_penalty: f64,
    pub base_interval_days: f64,
    pub maximum_interval_days: f64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            maximum_ease: 3.0,
            correct_bonus: 0.1,
            incorrect_penalty: 0.2,
            base_interval_days: 1.0,
            maximum_interval_days: 3650.0,
        }
    }
}

/// Result of applying one attempt to a review state.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub new_state: ReviewState,
    pub next_review: DateTime<Utc>,
}

impl Scheduler {
    /// State for a question that has never been attempted.
    pub fn initial_state(&self) -> ReviewState {
        ReviewState {
            attempts: 0,
            correct_count: 0,
            streak: 0,
            ease: self.initial_ease,
            avg_response_secs: 0.0,
            next_review: None,
        }
    }

    /// Apply one attempt and compute the next review date.
    ///
    /// The running average response time is only updated when a response
    /// time was tracked for the attempt.
    pub fn review(
        &self,
        state: &ReviewState,
        correct: bool,
        response_secs: Option<f64>,
        now: DateTime<Utc>,
    ) -> ReviewOutcome {
        let attempts = state.attempts + 1;
        let correct_count = state.correct_count + u32::from(correct);
        let streak = if correct { state.streak + 1 } else { 0 };
        let ease = if correct {
            (state.ease + self.correct_bonus).min(self.maximum_ease)
        } else {
            (state.ease - self.incorrect_penalty).max(self.minimum_ease)
        };

        let avg_response_secs = match response_secs {
            Some(rt) => state.avg_response_secs + (rt - state.avg_response_secs) / attempts as f64,
            None => state.avg_response_secs,
        };

        // ease^streak outgrows the calendar quickly; the cap keeps the
        // interval (and the Duration below) finite.
        let interval_days =
            (self.base_interval_days * ease.powi(streak as i32)).min(self.maximum_interval_days);
        let next_review = now + Duration::seconds((interval_days * 86_400.0) as i64);

        ReviewOutcome {
            new_state: ReviewState {
                attempts,
                correct_count,
                streak,
                ease,
                avg_response_secs,
                next_review: Some(next_review),
            },
            next_review,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn first_correct_attempt_initializes_counts() {
        let scheduler = Scheduler::default();
        let outcome = scheduler.review(&scheduler.initial_state(), true, Some(10.0), now());
        assert_eq!(outcome.new_state.attempts, 1);
        assert_eq!(outcome.new_state.correct_count, 1);
        assert_eq!(outcome.new_state.avg_response_secs, 10.0);
    }

    #[test]
    fn streak_rises_with_correct_and_resets_on_miss() {
        let scheduler = Scheduler::default();
        let t = now();
        let s1 = scheduler.review(&scheduler.initial_state(), true, None, t).new_state;
        assert_eq!(s1.streak, 1);
        let s2 = scheduler.review(&s1, true, None, t).new_state;
        assert_eq!(s2.streak, 2);
        let s3 = scheduler.review(&s2, false, None, t).new_state;
        assert_eq!(s3.streak, 0);
    }

    #[test]
    fn ease_rises_twice_then_falls_once() {
        let scheduler = Scheduler::default();
        let t = now();
        let s1 = scheduler.review(&scheduler.initial_state(), true, None, t).new_state;
        assert!(s1.ease > scheduler.initial_ease);
        let s2 = scheduler.review(&s1, true, None, t).new_state;
        assert!(s2.ease > s1.ease);
        let s3 = scheduler.review(&s2, false, None, t).new_state;
        assert!(s3.ease < s2.ease);
    }

    #[test]
    fn ease_stays_within_bounds() {
        let scheduler = Scheduler::default();
        let t = now();
        let mut state = scheduler.initial_state();
        for _ in 0..50 {
            state = scheduler.review(&state, false, None, t).new_state;
            assert!(state.ease >= scheduler.minimum_ease);
        }
        for _ in 0..50 {
            state = scheduler.review(&state, true, None, t).new_state;
            assert!(state.ease <= scheduler.maximum_ease);
        }
    }

    #[test]
    fn correct_count_never_exceeds_attempts() {
        let scheduler = Scheduler::default();
        let t = now();
        let mut state = scheduler.initial_state();
        for i in 0..20 {
            state = scheduler.review(&state, i % 3 == 0, None, t).new_state;
            assert!(state.correct_count <= state.attempts);
        }
    }

    #[test]
    fn interval_grows_with_streak() {
        let scheduler = Scheduler::default();
        let t = now();
        let s1 = scheduler.review(&scheduler.initial_state(), true, None, t).new_state;
        let s2 = scheduler.review(&s1, true, None, t).new_state;
        // streak 2 schedules further out than streak 1
        assert!(s2.next_review.unwrap() > s1.next_review.unwrap());
    }

    #[test]
    fn long_streak_caps_the_interval() {
        let scheduler = Scheduler::default();
        let t = now();
        let mut state = scheduler.initial_state();
        for _ in 0..30 {
            state = scheduler.review(&state, true, None, t).new_state;
        }
        assert_eq!(state.streak, 30);
        let cap = t + Duration::seconds((scheduler.maximum_interval_days * 86_400.0) as i64);
        assert_eq!(state.next_review.unwrap(), cap);
    }

    #[test]
    fn miss_schedules_at_base_interval() {
        let scheduler = Scheduler::default();
        let t = now();
        let s1 = scheduler.review(&scheduler.initial_state(), false, None, t).new_state;
        // streak 0 means ease^0 = 1, so exactly one base interval out
        assert_eq!(s1.next_review.unwrap(), t + Duration::seconds(86_400));
    }

    #[test]
    fn running_average_merges_response_times() {
        let scheduler = Scheduler::default();
        let t = now();
        let s1 = scheduler.review(&scheduler.initial_state(), true, Some(10.0), t).new_state;
        let s2 = scheduler.review(&s1, true, Some(20.0), t).new_state;
        assert_eq!(s2.avg_response_secs, 15.0);
        // untracked attempt leaves the average alone
        let s3 = scheduler.review(&s2, true, None, t).new_state;
        assert_eq!(s3.avg_response_secs, 15.0);
    }
}
