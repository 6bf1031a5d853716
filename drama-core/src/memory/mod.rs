//! Character memory: trust, suspicion, mood and knowledge.
//!
//! All profile mutation goes through [`MemoryModel`]. Each update records
//! a [`MemoryAuditEntry`] in the story state so a run can be replayed and
//! inspected afterwards.

mod audit;
mod effects;
mod signals;
mod snapshot;

pub use audit::{AuditSource, MemoryAuditEntry, ProfileValues};
pub use effects::{action_token, match_rule, snake_words, ActionRule, ACTION_RULES};
pub use signals::{detect, DialogueSignal, SignalCategory, DIALOGUE_SIGNALS};
pub use snapshot::MemorySnapshot;

use crate::story::{SocialRole, StoryState};
use serde::{Deserialize, Serialize};

/// Give `token` to `character`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeGrant {
    pub character: String,
    pub token: String,
}

impl KnowledgeGrant {
    pub fn new(character: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            token: token.into(),
        }
    }
}

/// Stateless service that applies memory rules to a [`StoryState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryModel;

impl MemoryModel {
    pub fn new() -> Self {
        Self
    }

    /// Apply dialogue signals: every other character adjusts toward the
    /// speaker by the deltas of every matching lexicon.
    pub fn update_from_dialogue(&self, state: &mut StoryState, speaker: &str, text: &str, turn: u32) {
        let role = state
            .profile(speaker)
            .map(|p| p.role)
            .unwrap_or(SocialRole::Ordinary);
        let matched = detect(text, role);
        let before = audit::capture(state);

        for signal in &matched {
            for observer in state.profiles_mut() {
                if observer.name == speaker {
                    continue;
                }
                observer.adjust_suspicion(speaker, signal.suspicion_delta);
                observer.adjust_trust(speaker, signal.trust_delta);
            }
        }

        let signals: Vec<String> = matched.iter().map(|s| s.category.name().to_string()).collect();
        if !signals.is_empty() {
            tracing::debug!(turn, speaker, ?signals, "Dialogue signals applied");
        }

        let after = audit::capture(state);
        state.memory_audit.push(MemoryAuditEntry {
            turn,
            source: AuditSource::Dialogue {
                speaker: speaker.to_string(),
                signals,
            },
            before,
            after,
        });
    }

    /// Apply the first matching action rule, then grant the actor a
    /// `did:` token for the action.
    pub fn update_from_action(
        &self,
        state: &mut StoryState,
        actor: &str,
        action: &str,
        targets: &[String],
        turn: u32,
    ) {
        let rule = match_rule(action);
        let before = audit::capture(state);

        if let Some(rule) = rule {
            if let Some(profile) = state.profile_mut(actor) {
                profile.emotional_state = rule.actor_emotion;
                if let Some(token) = rule.actor_knowledge {
                    profile.learn(token);
                }
            }
            for target in targets {
                let Some(profile) = state.profile_mut(target) else {
                    continue;
                };
                profile.adjust_trust(actor, rule.target_trust_delta);
                profile.adjust_suspicion(actor, rule.target_suspicion_delta);
                if let Some(prefix) = rule.target_knowledge {
                    profile.learn(format!("{prefix}:{}", snake_words(actor, usize::MAX)));
                }
            }
        }

        if let Some(profile) = state.profile_mut(actor) {
            profile.learn(action_token(action));
        }

        tracing::debug!(turn, actor, rule = rule.map(|r| r.name), "Action effects applied");

        let after = audit::capture(state);
        state.memory_audit.push(MemoryAuditEntry {
            turn,
            source: AuditSource::Action {
                actor: actor.to_string(),
                rule: rule.map(|r| r.name.to_string()),
            },
            before,
            after,
        });
    }

    /// Hand out knowledge tokens. Grants naming unknown characters are skipped.
    pub fn grant_knowledge(&self, state: &mut StoryState, grants: &[KnowledgeGrant]) {
        for grant in grants {
            match state.profile_mut(&grant.character) {
                Some(profile) => {
                    profile.learn(grant.token.clone());
                }
                None => {
                    tracing::warn!(character = %grant.character, "Knowledge grant for unknown character");
                }
            }
        }
    }

    pub fn snapshot(&self, state: &StoryState, name: &str) -> Option<MemorySnapshot> {
        MemorySnapshot::build(state, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{DialogueTurn, EmotionalState};
    use crate::testing::TestHarness;
    use chrono::Utc;

    const SALEEM: &str = "Saleem";
    const AHMED: &str = "Ahmed Malik";
    const RAZA: &str = "Constable Raza";
    const JAMEEL: &str = "Uncle Jameel";

    #[test]
    fn test_aggressive_line_moves_every_observer() {
        let mut state = TestHarness::new().state();
        let memory = MemoryModel::new();

        memory.update_from_dialogue(&mut state, AHMED, "You thief, I will have you in jail!", 1);

        for observer in [SALEEM, RAZA, JAMEEL] {
            let profile = state.profile(observer).unwrap();
            assert!((profile.suspicion_toward(AHMED) - 0.25).abs() < 1e-6);
            assert!((profile.trust_toward(AHMED) - 0.40).abs() < 1e-6);
        }
        // The speaker's own view is untouched.
        assert_eq!(state.profile(AHMED).unwrap().trust_toward(SALEEM), 0.5);
    }

    #[test]
    fn test_corrupt_signal_requires_authority() {
        let mut state = TestHarness::new().state();
        let memory = MemoryModel::new();
        let line = "There is a small facilitation fee for this paperwork.";

        memory.update_from_dialogue(&mut state, JAMEEL, line, 1);
        assert!((state.profile(SALEEM).unwrap().suspicion_toward(JAMEEL) - 0.1).abs() < 1e-6);

        memory.update_from_dialogue(&mut state, RAZA, line, 2);
        let saleem = state.profile(SALEEM).unwrap();
        assert!((saleem.suspicion_toward(RAZA) - 0.30).abs() < 1e-6);
        assert!((saleem.trust_toward(RAZA) - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_dialogue_update_is_audited() {
        let mut state = TestHarness::new().state();
        MemoryModel::new().update_from_dialogue(&mut state, SALEEM, "Please, my children!", 3);

        let entry = state.memory_audit.last().unwrap();
        assert_eq!(entry.turn, 3);
        assert_eq!(entry.before.len(), 4);
        assert_eq!(entry.after.len(), 4);
        assert_eq!(entry.changed(), vec![AHMED, RAZA, JAMEEL]);
    }

    #[test]
    fn test_accusation_targets_grow_suspicious() {
        let mut state = TestHarness::new().state();
        let targets = vec![SALEEM.to_string(), JAMEEL.to_string()];

        MemoryModel::new().update_from_action(&mut state, AHMED, "blames Saleem loudly", &targets, 4);

        assert_eq!(state.profile(AHMED).unwrap().emotional_state, EmotionalState::Angry);
        let saleem = state.profile(SALEEM).unwrap();
        assert!((saleem.suspicion_toward(AHMED) - 0.3).abs() < 1e-6);
        assert!((saleem.trust_toward(AHMED) - 0.4).abs() < 1e-6);
        // Not a target.
        assert!((state.profile(RAZA).unwrap().suspicion_toward(AHMED) - 0.1).abs() < 1e-6);
        assert!(state.profile(AHMED).unwrap().knows("did:blames_saleem_loudly"));
    }

    #[test]
    fn test_search_grants_actor_knowledge() {
        let mut state = TestHarness::new().state();
        MemoryModel::new().update_from_action(
            &mut state,
            SALEEM,
            "frantically searches rickshaw for registration papers",
            &[],
            2,
        );

        let saleem = state.profile(SALEEM).unwrap();
        assert_eq!(saleem.emotional_state, EmotionalState::Anxious);
        assert!(saleem.knows("searched_scene"));
        assert!(saleem.knows("did:frantically_searches_rickshaw_for"));
        assert!(matches!(
            &state.memory_audit.last().unwrap().source,
            AuditSource::Action { rule: Some(rule), .. } if rule == "search"
        ));
    }

    #[test]
    fn test_unmatched_action_still_grants_token() {
        let mut state = TestHarness::new().state();
        MemoryModel::new().update_from_action(&mut state, JAMEEL, "addresses the crowd", &[], 2);

        let jameel = state.profile(JAMEEL).unwrap();
        assert_eq!(jameel.emotional_state, EmotionalState::Neutral);
        assert!(jameel.knows("did:addresses_the_crowd"));
    }

    #[test]
    fn test_unknown_grant_is_skipped() {
        let mut state = TestHarness::new().state();
        let before = state.profile(SALEEM).unwrap().clone();
        MemoryModel::new().grant_knowledge(
            &mut state,
            &[
                KnowledgeGrant::new("Nobody", "ghost"),
                KnowledgeGrant::new(SALEEM, "crowd_is_on_my_side"),
            ],
        );
        assert!(state.profile(SALEEM).unwrap().knows("crowd_is_on_my_side"));
        assert_eq!(before.knowledge().len() + 1, state.profile(SALEEM).unwrap().knowledge().len());
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let mut state = TestHarness::new().state();
        for (i, line) in ["one", "two", "three", "four"].iter().enumerate() {
            state.dialogue_history.push(DialogueTurn {
                turn_number: i as u32 + 1,
                speaker: SALEEM.to_string(),
                text: line.to_string(),
                timestamp: Utc::now(),
            });
        }
        let memory = MemoryModel::new();

        let first = memory.snapshot(&state, SALEEM).unwrap();
        let second = memory.snapshot(&state, SALEEM).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.recent_own_dialogue, vec!["two", "three", "four"]);
        assert_eq!(first.top_trust.len(), 2);
        assert!(memory.snapshot(&state, "Nobody").is_none());
    }
}
