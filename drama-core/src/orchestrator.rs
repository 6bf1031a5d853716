//! Story orchestration: one scheduling step per turn.
//!
//! # Example
//!
//! ```ignore
//! use drama_core::{Scenario, StoryConfig, StoryOrchestrator, ClaudeGenerator};
//! use std::sync::Arc;
//!
//! let config = StoryConfig::from_env();
//! let generator = Arc::new(ClaudeGenerator::from_env(&config)?);
//! let mut story = StoryOrchestrator::new(Scenario::rickshaw_accident(), config, generator)?;
//! story.run().await?;
//! story.save("story_output.json").await?;
//! ```

use crate::character::CharacterLine;
use crate::config::StoryConfig;
use crate::director::{ActionChoice, Director, MoveKind, SpeakerSelection};
use crate::generation::{GenerationError, GenerationRequest, TextGenerator};
use crate::persist::{PersistError, StoryArtifact};
use crate::prompts::CharacterPrompt;
use crate::scenario::{Scenario, ScenarioError};
use crate::story::{Conclusion, DialogueTurn, NarrativeEvent, StoryState};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors from running a story.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Story has already concluded")]
    AlreadyConcluded,
}

/// What one step produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub turn: u32,
    pub kind: MoveKind,
    /// Events appended this turn, in order.
    pub events: Vec<NarrativeEvent>,
    pub concluded: bool,
}

/// Owns the story state and runs turns against a director and a generator.
pub struct StoryOrchestrator {
    director: Director,
    generator: Arc<dyn TextGenerator>,
    state: StoryState,
    rng: StdRng,
}

impl StoryOrchestrator {
    /// Create a story. The config's seed drives every random draw.
    pub fn new(
        scenario: Scenario,
        config: StoryConfig,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self, StoryError> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let state = StoryState::new(&scenario, &config, &mut rng);
        let director = Director::new(scenario, config.pacing)?;

        Ok(Self {
            director,
            generator,
            state,
            rng,
        })
    }

    pub fn state(&self) -> &StoryState {
        &self.state
    }

    pub fn director(&self) -> &Director {
        &self.director
    }

    pub fn is_concluded(&self) -> bool {
        self.state.concluded
    }

    /// Play one turn.
    ///
    /// The turn runs against a draft copy of the state and rng and is
    /// committed only once it completes. Dropping the future mid-turn
    /// leaves the story exactly as it was.
    pub async fn step(&mut self) -> Result<TurnOutcome, StoryError> {
        if self.state.concluded {
            return Err(StoryError::AlreadyConcluded);
        }

        let mut draft = self.state.clone();
        let mut rng = self.rng.clone();
        draft.turn += 1;
        let turn = draft.turn;
        let first_new = draft.events.len();

        let kind = self.director.decide_next_move(&draft, &mut rng);
        let kind = match kind {
            MoveKind::Action => match self.director.select_actor_for_action(&mut draft, &mut rng) {
                Some(choice) => {
                    self.play_action(&mut draft, choice);
                    MoveKind::Action
                }
                None => {
                    self.play_dialogue(&mut draft, &mut rng).await;
                    MoveKind::Dialogue
                }
            },
            MoveKind::Dialogue => {
                self.play_dialogue(&mut draft, &mut rng).await;
                MoveKind::Dialogue
            }
        };

        let check = self.director.check_conclusion_deterministic(&draft, &mut rng);
        if check.concluded {
            draft.append_event(NarrativeEvent::Conclusion {
                turn,
                content: check.narration.clone(),
            });
            draft.concluded = true;
            draft.conclusion = Some(Conclusion {
                reason: check.reason,
                final_narration: check.narration,
            });
        }

        let outcome = TurnOutcome {
            turn,
            kind,
            events: draft.events[first_new..].to_vec(),
            concluded: draft.concluded,
        };

        self.state = draft;
        self.rng = rng;
        Ok(outcome)
    }

    /// Play turns until the story concludes.
    pub async fn run(&mut self) -> Result<&StoryState, StoryError> {
        while !self.state.concluded {
            self.step().await?;
        }
        Ok(&self.state)
    }

    pub fn artifact(&self) -> StoryArtifact {
        StoryArtifact::from_state(&self.state)
    }

    /// Write the story artifact as JSON.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), StoryError> {
        self.artifact().save_json(path).await?;
        Ok(())
    }

    fn release_clue(&self, draft: &mut StoryState) {
        let turn = draft.turn;
        if let Some(release) = self.director.clues().release(draft, turn) {
            self.director.memory().grant_knowledge(draft, &release.grants);
            draft.append_event(NarrativeEvent::MysteryClue {
                turn,
                clue_type: release.clue_type,
                content: release.content,
            });
        }
    }

    fn play_action(&self, draft: &mut StoryState, choice: ActionChoice) {
        let turn = draft.turn;
        self.release_clue(draft);

        self.director.memory().update_from_action(
            draft,
            &choice.character,
            &choice.action,
            &choice.targets,
            turn,
        );
        draft.action_count += 1;
        draft.consecutive_dialogue_count = 0;

        draft.append_event(NarrativeEvent::Action {
            turn,
            action_number: draft.action_count,
            character: choice.character,
            action: choice.action,
            targets: choice.targets,
            effect: choice.effect,
            narrative_phase: choice.phase,
        });
    }

    async fn play_dialogue(&self, draft: &mut StoryState, rng: &mut StdRng) {
        let turn = draft.turn;
        let SpeakerSelection {
            speaker,
            narration,
            speaker_goal,
            turning_point,
            intervention,
        } = self
            .director
            .select_next_speaker(draft, rng, self.generator.as_ref())
            .await;

        if let Some(event) = intervention {
            draft.append_event(NarrativeEvent::HardIntervention {
                turn,
                event_id: event.id,
                content: event.narration,
                effect: event.effect,
            });
        }
        if let Some(event) = turning_point {
            draft.append_event(NarrativeEvent::TurningPoint {
                turn,
                event_id: event.id,
                content: event.narration,
                effect: event.effect,
            });
        }
        self.release_clue(draft);
        if !narration.trim().is_empty() {
            draft.append_event(NarrativeEvent::DirectorNote {
                turn,
                content: narration.clone(),
            });
        }

        let line = self.character_line(draft, &speaker, &speaker_goal, &narration).await;

        for (item, patch) in &line.entity_updates {
            if !draft.registry.update(item, patch.clone()) {
                tracing::warn!(turn, speaker = %speaker, item = %item, "Ignoring update to unregistered item");
            }
        }

        self.director
            .memory()
            .update_from_dialogue(draft, &speaker, &line.dialogue, turn);
        draft.dialogue_history.push(DialogueTurn {
            turn_number: turn,
            speaker: speaker.clone(),
            text: line.dialogue.clone(),
            timestamp: Utc::now(),
        });
        draft.consecutive_dialogue_count += 1;

        draft.append_event(NarrativeEvent::Dialogue {
            turn,
            speaker,
            content: line.dialogue,
            speaker_goal,
            agentic_reasoning: line.reasoning,
        });
    }

    async fn character_line(
        &self,
        draft: &StoryState,
        speaker: &str,
        speaker_goal: &str,
        narration: &str,
    ) -> CharacterLine {
        let Some(snapshot) = self.director.memory().snapshot(draft, speaker) else {
            let missing = GenerationError::Unavailable(format!("no profile for {speaker}"));
            return CharacterLine::from_result(Err(missing), speaker);
        };

        let prompt = CharacterPrompt {
            state: draft,
            name: speaker,
            snapshot: &snapshot,
            speaker_goal,
            narration,
        }
        .render();

        let result = self
            .generator
            .generate(GenerationRequest::new(speaker, prompt))
            .await;
        CharacterLine::from_result(result, speaker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::DIRECTOR_AGENT;
    use crate::testing::{assert_event_order, character_json, ScriptedGenerator};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::time::timeout;

    fn story(seed: u64, generator: ScriptedGenerator) -> StoryOrchestrator {
        StoryOrchestrator::new(
            Scenario::rickshaw_accident(),
            StoryConfig::new().with_seed(seed),
            Arc::new(generator),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_turn_counter_advances_by_one() {
        let mut story = story(1, ScriptedGenerator::new());
        for expected in 1..=5 {
            let outcome = story.step().await.unwrap();
            assert_eq!(outcome.turn, expected);
            assert_eq!(story.state().turn, expected);
        }
    }

    #[tokio::test]
    async fn test_first_turn_is_dialogue_with_note() {
        let generator = ScriptedGenerator::new()
            .with_director_json("Ahmed Malik", "A horn blares.", "Demand his papers.")
            .with_agent_default("Ahmed Malik", character_json("Where are your papers?"));
        let mut story = story(3, generator);

        let outcome = story.step().await.unwrap();
        assert_eq!(outcome.kind, MoveKind::Dialogue);
        let kinds: Vec<&str> = outcome.events.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["director_note", "dialogue"]);
        assert_eq!(story.state().consecutive_dialogue_count, 1);
        assert_eq!(story.state().dialogue_history[0].text, "Where are your papers?");
    }

    #[tokio::test]
    async fn test_unregistered_entity_update_is_ignored() {
        let reply = r#"{"thought": "", "action_decision": "none", "dialogue": "Found it!",
                        "entity_updates": {"wallet": {"status": "found"}, "unicorn": {"status": "lost"}}}"#;
        let generator = ScriptedGenerator::new()
            .with_director_json("Saleem", "", "")
            .with_agent_default("Saleem", reply);
        let mut story = story(4, generator);

        story.step().await.unwrap();
        let registry = &story.state().registry;
        assert_eq!(registry.get("wallet").unwrap().status, "found");
        assert_eq!(registry.get_owner("wallet"), Some("Saleem"));
        assert!(!registry.contains("unicorn"));
    }

    #[tokio::test]
    async fn test_run_concludes_within_bounds() {
        let mut story = story(8, ScriptedGenerator::new());
        let state = story.run().await.unwrap();

        assert!(state.concluded);
        assert!(state.turn >= 15 && state.turn <= state.max_turns);
        assert_event_order(state);
        assert!(matches!(state.events.last(), Some(NarrativeEvent::Conclusion { .. })));
        assert!(matches!(story.step().await, Err(StoryError::AlreadyConcluded)));
    }

    /// Passes director calls through and holds every character call open
    /// while `stalled` is set.
    struct StallingGenerator {
        inner: ScriptedGenerator,
        stalled: AtomicBool,
    }

    #[async_trait::async_trait]
    impl TextGenerator for StallingGenerator {
        async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
            if request.agent != DIRECTOR_AGENT && self.stalled.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            self.inner.generate(request).await
        }
    }

    fn assert_in_step(story: &StoryOrchestrator, twin: &StoryOrchestrator) {
        assert_eq!(story.artifact(), twin.artifact());
        assert_eq!(story.state().turn, twin.state().turn);
        assert_eq!(story.state().triggers, twin.state().triggers);
        assert_eq!(
            story.state().consecutive_dialogue_count,
            twin.state().consecutive_dialogue_count
        );
    }

    #[tokio::test]
    async fn test_cancelled_turn_leaves_state_untouched() {
        let scenario = Scenario::rickshaw_accident();
        let generator = Arc::new(StallingGenerator {
            inner: ScriptedGenerator::offline(&scenario),
            stalled: AtomicBool::new(false),
        });
        let config = StoryConfig::new().with_seed(5);
        let mut story =
            StoryOrchestrator::new(scenario.clone(), config.clone(), generator.clone()).unwrap();
        let mut twin = StoryOrchestrator::new(
            scenario.clone(),
            config,
            Arc::new(ScriptedGenerator::offline(&scenario)),
        )
        .unwrap();

        for _ in 0..6 {
            story.step().await.unwrap();
            twin.step().await.unwrap();
        }
        assert_in_step(&story, &twin);

        // Every dialogue turn from here on is cut off at the character call
        // once, then replayed. Action turns never reach a character.
        let mut cancelled = 0;
        while !story.is_concluded() {
            let before = story.artifact();
            let turn = story.state().turn;
            let asked = generator.inner.requests().await.len();

            generator.stalled.store(true, Ordering::SeqCst);
            match timeout(Duration::from_millis(50), story.step()).await {
                Ok(outcome) => {
                    assert_eq!(outcome.unwrap().kind, MoveKind::Action);
                }
                Err(_) => {
                    cancelled += 1;
                    // The director was consulted before the turn was cut off.
                    assert_eq!(generator.inner.requests().await.len(), asked + 1);
                    assert_eq!(story.artifact(), before);
                    assert_eq!(story.state().turn, turn);

                    generator.stalled.store(false, Ordering::SeqCst);
                    let outcome = story.step().await.unwrap();
                    assert_eq!(outcome.turn, turn + 1);
                }
            }

            twin.step().await.unwrap();
            assert_in_step(&story, &twin);
        }

        assert!(cancelled > 0);
        assert!(twin.is_concluded());
    }
}
