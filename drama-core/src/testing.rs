//! Testing utilities for the drama director.
//!
//! This module provides tools for integration testing:
//! - `ScriptedGenerator` for deterministic runs without API calls
//! - `TestHarness` for building states and directors from the built-in scenario
//! - Assertion helpers for verifying story invariants

use crate::config::{Pacing, StoryConfig};
use crate::director::Director;
use crate::generation::{GenerationError, GenerationRequest, TextGenerator, DIRECTOR_AGENT};
use crate::mystery::{ClueScheduler, HiddenTruth};
use crate::plot_clock::PlotClock;
use crate::scenario::{Scenario, ScenarioError};
use crate::story::{NarrativeEvent, StoryState};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tokio::sync::Mutex;

/// Reply used when nothing else is scripted for an agent.
pub const DEFAULT_REPLY: &str = "...";

/// A scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    Text(String),
    Fail,
}

impl MockResponse {
    pub fn text(text: impl Into<String>) -> Self {
        MockResponse::Text(text.into())
    }
}

/// A text generator that returns scripted replies per agent.
///
/// Each agent has a queue that is drained first; after that the agent's
/// default (or the global default) is returned. Every request is recorded.
pub struct ScriptedGenerator {
    queues: Mutex<BTreeMap<String, VecDeque<MockResponse>>>,
    agent_defaults: BTreeMap<String, MockResponse>,
    default_reply: MockResponse,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(BTreeMap::new()),
            agent_defaults: BTreeMap::new(),
            default_reply: MockResponse::text(DEFAULT_REPLY),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A generator for running without a model: the director always
    /// defers to the fallback speaker and every character gets one
    /// in-character line.
    pub fn offline(scenario: &Scenario) -> Self {
        let mut generator = Self::new().with_agent_default(
            DIRECTOR_AGENT,
            director_json("", "The crowd presses closer as horns blare on Shahrah-e-Faisal.", ""),
        );
        for character in &scenario.characters {
            let line = serde_json::json!({
                "thought": format!("{} weighs what to say next.", character.name),
                "action_decision": "none",
                "dialogue": format!("I am {}, and I will not be ignored!", character.name),
            });
            generator = generator.with_agent_default(&character.name, line.to_string());
        }
        generator
    }

    /// Reply returned to any agent without a queue or default.
    pub fn with_default(mut self, text: impl Into<String>) -> Self {
        self.default_reply = MockResponse::text(text);
        self
    }

    pub fn with_agent_default(mut self, agent: impl Into<String>, text: impl Into<String>) -> Self {
        self.agent_defaults.insert(agent.into(), MockResponse::text(text));
        self
    }

    /// Default director reply proposing `speaker`.
    pub fn with_director_json(self, speaker: &str, narration: &str, goal: &str) -> Self {
        self.with_agent_default(DIRECTOR_AGENT, director_json(speaker, narration, goal))
    }

    /// Every request from `agent` fails.
    pub fn failing_for(mut self, agent: impl Into<String>) -> Self {
        self.agent_defaults.insert(agent.into(), MockResponse::Fail);
        self
    }

    /// Queue one reply for `agent`.
    pub fn with_reply(mut self, agent: impl Into<String>, response: MockResponse) -> Self {
        self.queues
            .get_mut()
            .entry(agent.into())
            .or_default()
            .push_back(response);
        self
    }

    /// Queue one reply for `agent` after construction.
    pub async fn push(&self, agent: impl Into<String>, response: MockResponse) {
        self.queues
            .lock()
            .await
            .entry(agent.into())
            .or_default()
            .push_back(response);
    }

    /// All requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let queued = self
            .queues
            .lock()
            .await
            .get_mut(&request.agent)
            .and_then(VecDeque::pop_front);
        let response = queued
            .or_else(|| self.agent_defaults.get(&request.agent).cloned())
            .unwrap_or_else(|| self.default_reply.clone());

        let agent = request.agent.clone();
        self.requests.lock().await.push(request);

        match response {
            MockResponse::Text(text) => Ok(text),
            MockResponse::Fail => Err(GenerationError::Unavailable(format!(
                "scripted failure for {agent}"
            ))),
        }
    }
}

/// JSON a director model would return.
pub fn director_json(speaker: &str, narration: &str, goal: &str) -> String {
    serde_json::json!({
        "next_speaker": speaker,
        "narration": narration,
        "speaker_goal": goal,
    })
    .to_string()
}

/// JSON a character model would return.
pub fn character_json(dialogue: &str) -> String {
    serde_json::json!({
        "thought": "",
        "action_decision": "none",
        "dialogue": dialogue,
    })
    .to_string()
}

/// Builds states and directors from a scenario and config.
pub struct TestHarness {
    pub scenario: Scenario,
    pub config: StoryConfig,
    director: Director,
}

impl TestHarness {
    /// The built-in scenario with the default config and seed 0.
    pub fn new() -> Self {
        Self::built_in(StoryConfig::new())
    }

    /// The built-in scenario with the hidden truth pinned.
    pub fn with_truth(truth: HiddenTruth) -> Self {
        Self::built_in(StoryConfig::new().with_hidden_truth(truth))
    }

    pub fn with_config(config: StoryConfig) -> Self {
        Self::built_in(config)
    }

    pub fn try_new(scenario: Scenario, config: StoryConfig) -> Result<Self, ScenarioError> {
        let director = Director::new(scenario.clone(), config.pacing.clone())?;
        Ok(Self {
            scenario,
            config,
            director,
        })
    }

    #[track_caller]
    fn built_in(config: StoryConfig) -> Self {
        match Self::try_new(Scenario::rickshaw_accident(), config) {
            Ok(harness) => harness,
            Err(e) => panic!("built-in scenario failed validation: {e}"),
        }
    }

    /// A fresh state, created from an rng seeded with the config's seed.
    pub fn state(&self) -> StoryState {
        StoryState::new(
            &self.scenario,
            &self.config,
            &mut StdRng::seed_from_u64(self.config.seed),
        )
    }

    pub fn director(&self) -> &Director {
        &self.director
    }

    #[track_caller]
    pub fn director_with_pacing(&self, pacing: Pacing) -> Director {
        match Director::new(self.scenario.clone(), pacing) {
            Ok(director) => director,
            Err(e) => panic!("scenario failed validation: {e}"),
        }
    }

    pub fn clock(&self) -> &PlotClock {
        self.director.clock()
    }

    pub fn scheduler(&self) -> &ClueScheduler {
        self.director.clues()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert every trust and suspicion value lies in [0, 1].
#[track_caller]
pub fn assert_relationships_clamped(state: &StoryState) {
    for profile in state.profiles() {
        for (other, value) in profile.trust.iter().chain(profile.suspicion.iter()) {
            assert!(
                (0.0..=1.0).contains(value),
                "{} has out-of-range value {value} toward {other}",
                profile.name
            );
        }
    }
}

/// Assert events are in turn order and, within a turn, in layout order.
#[track_caller]
pub fn assert_event_order(state: &StoryState) {
    for pair in state.events.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            (a.turn(), a.order_rank()) <= (b.turn(), b.order_rank()),
            "{} at turn {} precedes {} at turn {}",
            a.kind(),
            a.turn(),
            b.kind(),
            b.turn()
        );
    }
}

/// Assert at most one action or dialogue event per turn.
#[track_caller]
pub fn assert_one_move_per_turn(state: &StoryState) {
    let mut seen = BTreeSet::new();
    for event in &state.events {
        if matches!(
            event,
            NarrativeEvent::Action { .. } | NarrativeEvent::Dialogue { .. }
        ) {
            assert!(
                seen.insert(event.turn()),
                "turn {} has more than one move",
                event.turn()
            );
        }
    }
}

/// Count events of one kind.
pub fn count_kind(state: &StoryState, kind: &str) -> usize {
    state.events.iter().filter(|e| e.kind() == kind).count()
}
