//! Deciding when the story ends.

use super::Director;
use crate::story::StoryState;
use rand::rngs::StdRng;
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConclusionCheck {
    pub concluded: bool,
    pub reason: String,
    /// Mystery reveal when concluded, otherwise empty.
    pub narration: String,
}

impl ConclusionCheck {
    fn carry_on(reason: impl Into<String>) -> Self {
        Self {
            concluded: false,
            reason: reason.into(),
            narration: String::new(),
        }
    }
}

impl Director {
    /// Check whether the story ends on the turn just played.
    ///
    /// Never before the minimum turn, always at the story's turn limit, and
    /// by chance in between once the early-conclusion turn is reached.
    pub fn check_conclusion_deterministic(&self, state: &StoryState, rng: &mut StdRng) -> ConclusionCheck {
        let turn = state.turn;
        let p = &self.pacing;

        if turn < p.minimum_turn {
            return ConclusionCheck::carry_on(format!(
                "Story must continue to minimum turn {}",
                p.minimum_turn
            ));
        }

        let reason = if turn >= state.max_turns {
            format!("Story concluded at turn {turn}")
        } else if turn >= p.early_conclusion_turn && rng.gen::<f64>() < p.early_conclusion_chance {
            format!("Natural resolution at turn {turn}")
        } else {
            return ConclusionCheck::carry_on("");
        };

        tracing::info!(turn, max_turns = state.max_turns, reason = %reason, "Story concluded");
        ConclusionCheck {
            concluded: true,
            reason,
            narration: self.mystery_reveal(state),
        }
    }

    /// Reveal paragraph for the hidden truth plus the coda of the turning
    /// point assigned at creation, whether or not it fired.
    pub fn mystery_reveal(&self, state: &StoryState) -> String {
        self.scenario
            .reveal(state.hidden_truth, &state.triggers.turning_point_id)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::TestHarness;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_never_before_minimum_turn() {
        let harness = TestHarness::new();
        let director = harness.director();
        let mut state = harness.state();
        state.max_turns = 10;

        for turn in 1..15 {
            state.turn = turn;
            let mut rng = StdRng::seed_from_u64(turn as u64);
            let check = director.check_conclusion_deterministic(&state, &mut rng);
            assert!(!check.concluded);
            assert_eq!(check.reason, "Story must continue to minimum turn 15");
            assert!(check.narration.is_empty());
        }
    }

    #[test]
    fn test_always_at_max_turns() {
        let harness = TestHarness::new();
        let director = harness.director();
        let mut state = harness.state();
        state.turn = state.max_turns;

        let check = director.check_conclusion_deterministic(&state, &mut StdRng::seed_from_u64(0));
        assert!(check.concluded);
        assert_eq!(check.reason, format!("Story concluded at turn {}", state.max_turns));
        assert_eq!(check.narration, director.mystery_reveal(&state));
    }

    #[test]
    fn test_no_early_end_between_minimum_and_early_turn() {
        let harness = TestHarness::new();
        let director = harness.director();
        let mut state = harness.state();
        state.max_turns = 22;

        for turn in 15..18 {
            state.turn = turn;
            for seed in 0..20 {
                let check = director.check_conclusion_deterministic(&state, &mut StdRng::seed_from_u64(seed));
                assert!(!check.concluded);
                assert!(check.reason.is_empty());
            }
        }
    }

    #[test]
    fn test_early_end_happens_for_some_seeds() {
        let harness = TestHarness::new();
        let director = harness.director();
        let mut state = harness.state();
        state.max_turns = 22;
        state.turn = 19;

        let ended = (0..200)
            .filter(|seed| {
                director
                    .check_conclusion_deterministic(&state, &mut StdRng::seed_from_u64(*seed))
                    .concluded
            })
            .count();
        assert!(ended > 0 && ended < 200);
    }
}
