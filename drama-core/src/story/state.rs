//! The story-state aggregate.

use crate::config::StoryConfig;
use crate::memory::MemoryAuditEntry;
use crate::mystery::{ClueType, HiddenTruth};
use crate::registry::EntityRegistry;
use crate::scenario::{Scenario, SeedStory};
use crate::story::{CharacterProfile, NarrativeEvent};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

/// Identifier for one story instance, derived from the story's seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryId(pub Uuid);

impl StoryId {
    pub fn from_rng(rng: &mut StdRng) -> Self {
        Self(uuid::Builder::from_random_bytes(rng.gen()).into_uuid())
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One spoken line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub turn_number: u32,
    pub speaker: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// One-shot triggers and the turning-point variant chosen at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerLedger {
    pub intervention_fired: bool,
    pub turning_point_fired: bool,
    /// Id of the turning point this story will use.
    pub turning_point_id: String,
}

/// Why and how the story ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conclusion {
    pub reason: String,
    pub final_narration: String,
}

/// Everything that changes while a story plays.
///
/// The orchestrator clones this into a draft at the start of a turn and
/// swaps the draft back in when the turn completes, so an observer never
/// sees a half-applied turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryState {
    pub id: StoryId,
    pub seed: SeedStory,
    /// Last completed turn; 0 before the first turn.
    pub turn: u32,
    pub concluded: bool,
    pub conclusion: Option<Conclusion>,
    pub events: Vec<NarrativeEvent>,
    pub dialogue_history: Vec<DialogueTurn>,
    /// Character names in scenario order.
    pub roster: Vec<String>,
    profiles: BTreeMap<String, CharacterProfile>,
    pub registry: EntityRegistry,
    pub action_count: u32,
    pub consecutive_dialogue_count: u32,
    pub hidden_truth: HiddenTruth,
    pub max_turns: u32,
    pub triggers: TriggerLedger,
    pub released_clues: BTreeSet<ClueType>,
    /// Action templates each character has already performed.
    pub used_actions: BTreeMap<String, BTreeSet<String>>,
    pub memory_audit: Vec<MemoryAuditEntry>,
}

impl StoryState {
    /// Set up a fresh story from a validated scenario.
    ///
    /// Draws, in order, the story id, the hidden truth, the turn limit and
    /// the turning-point variant from `rng`. A hidden truth pinned in the
    /// config replaces the drawn one without changing the draw sequence.
    pub fn new(scenario: &Scenario, config: &StoryConfig, rng: &mut StdRng) -> Self {
        let id = StoryId::from_rng(rng);

        let drawn = HiddenTruth::ALL
            .choose(rng)
            .copied()
            .unwrap_or(HiddenTruth::SaleemInnocent);
        let hidden_truth = config.hidden_truth.unwrap_or(drawn);

        let (lo, hi) = config.pacing.max_turns_range;
        let max_turns = rng.gen_range(lo.min(hi)..=hi.max(lo));

        let turning_point_id = scenario
            .turning_points
            .choose(rng)
            .map(|tp| tp.id.clone())
            .unwrap_or_default();

        let roster: Vec<String> = scenario.characters.iter().map(|c| c.name.clone()).collect();
        let profiles = scenario
            .characters
            .iter()
            .map(|seed| (seed.name.clone(), seed.to_profile(&roster)))
            .collect();

        let registry = scenario.initial_registry(hidden_truth);

        tracing::info!(
            story = %id,
            max_turns,
            turning_point = %turning_point_id,
            characters = roster.len(),
            "Story created"
        );

        Self {
            id,
            seed: scenario.seed.clone(),
            turn: 0,
            concluded: false,
            conclusion: None,
            events: Vec::new(),
            dialogue_history: Vec::new(),
            roster,
            profiles,
            registry,
            action_count: 0,
            consecutive_dialogue_count: 0,
            hidden_truth,
            max_turns,
            triggers: TriggerLedger {
                intervention_fired: false,
                turning_point_fired: false,
                turning_point_id,
            },
            released_clues: BTreeSet::new(),
            used_actions: BTreeMap::new(),
            memory_audit: Vec::new(),
        }
    }

    pub fn profile(&self, name: &str) -> Option<&CharacterProfile> {
        self.profiles.get(name)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &CharacterProfile> {
        self.roster.iter().filter_map(|name| self.profiles.get(name))
    }

    /// Profiles change only through the memory model.
    pub(crate) fn profile_mut(&mut self, name: &str) -> Option<&mut CharacterProfile> {
        self.profiles.get_mut(name)
    }

    pub(crate) fn profiles_mut(&mut self) -> impl Iterator<Item = &mut CharacterProfile> {
        self.profiles.values_mut()
    }

    /// Speakers of the last `n` dialogue turns, oldest first.
    pub fn recent_speakers(&self, n: usize) -> Vec<&str> {
        let start = self.dialogue_history.len().saturating_sub(n);
        self.dialogue_history[start..]
            .iter()
            .map(|t| t.speaker.as_str())
            .collect()
    }

    /// The last `n` lines spoken by `name`, oldest first.
    pub fn recent_lines_of(&self, name: &str, n: usize) -> Vec<&str> {
        let mut lines: Vec<&str> = self
            .dialogue_history
            .iter()
            .rev()
            .filter(|t| t.speaker == name)
            .take(n)
            .map(|t| t.text.as_str())
            .collect();
        lines.reverse();
        lines
    }

    pub fn dialogue_turn_count(&self) -> u32 {
        u32::try_from(self.dialogue_history.len()).unwrap_or(u32::MAX)
    }

    pub fn append_event(&mut self, event: NarrativeEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHarness;
    use rand::SeedableRng;

    #[test]
    fn test_creation_is_reproducible() {
        let scenario = Scenario::rickshaw_accident();
        let config = StoryConfig::new().with_seed(7);

        let a = StoryState::new(&scenario, &config, &mut StdRng::seed_from_u64(7));
        let b = StoryState::new(&scenario, &config, &mut StdRng::seed_from_u64(7));

        assert_eq!(a.id, b.id);
        assert_eq!(a.hidden_truth, b.hidden_truth);
        assert_eq!(a.max_turns, b.max_turns);
        assert_eq!(a.triggers, b.triggers);
    }

    #[test]
    fn test_max_turns_drawn_from_range() {
        let scenario = Scenario::rickshaw_accident();
        let config = StoryConfig::new();
        for seed in 0..50 {
            let state = StoryState::new(&scenario, &config, &mut StdRng::seed_from_u64(seed));
            assert!((18..=22).contains(&state.max_turns));
            assert!(scenario
                .turning_points
                .iter()
                .any(|tp| tp.id == state.triggers.turning_point_id));
        }
    }

    #[test]
    fn test_pinned_truth_keeps_draw_sequence() {
        let scenario = Scenario::rickshaw_accident();
        let free = StoryState::new(&scenario, &StoryConfig::new(), &mut StdRng::seed_from_u64(3));
        let pinned = StoryState::new(
            &scenario,
            &StoryConfig::new().with_hidden_truth(HiddenTruth::WalletNeverStolen),
            &mut StdRng::seed_from_u64(3),
        );

        assert_eq!(pinned.hidden_truth, HiddenTruth::WalletNeverStolen);
        assert_eq!(free.max_turns, pinned.max_turns);
        assert_eq!(free.triggers, pinned.triggers);
    }

    #[test]
    fn test_profiles_seeded_for_whole_cast() {
        let state = TestHarness::new().state();
        assert_eq!(state.roster.len(), 4);
        for profile in state.profiles() {
            assert_eq!(profile.trust.len(), 3);
            assert_eq!(profile.suspicion.len(), 3);
        }
    }

    #[test]
    fn test_recent_lines_of_speaker() {
        let mut state = TestHarness::new().state();
        for (i, (speaker, text)) in [("Saleem", "one"), ("Ahmed Malik", "two"), ("Saleem", "three")]
            .into_iter()
            .enumerate()
        {
            state.dialogue_history.push(DialogueTurn {
                turn_number: i as u32 + 1,
                speaker: speaker.to_string(),
                text: text.to_string(),
                timestamp: Utc::now(),
            });
        }

        assert_eq!(state.recent_lines_of("Saleem", 3), vec!["one", "three"]);
        assert_eq!(state.recent_speakers(2), vec!["Ahmed Malik", "Saleem"]);
    }

    #[test]
    fn test_dialogue_turn_count_tracks_history() {
        let mut state = TestHarness::new().state();
        assert_eq!(state.dialogue_turn_count(), 0);

        for turn in 1..=4 {
            state.dialogue_history.push(DialogueTurn {
                turn_number: turn,
                speaker: "Saleem".to_string(),
                text: "Sahib!".to_string(),
                timestamp: Utc::now(),
            });
        }
        assert_eq!(state.dialogue_turn_count(), 4);
    }
}
