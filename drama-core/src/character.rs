//! A character's spoken line and the reasoning that came with it.

use crate::generation::{parse_structured, GenerationError, Structured};
use crate::registry::EntityPatch;
use crate::story::AgenticReasoning;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Dialogue used when the generator fails outright.
pub const SILENT_LINE: &str = "...";

/// Gesture recorded when the character made none.
pub const NO_ACTION: &str = "none";

#[derive(Debug, Clone, Default, Deserialize)]
struct CharacterReply {
    #[serde(default)]
    thought: String,
    #[serde(default)]
    action_decision: String,
    #[serde(default)]
    dialogue: String,
    #[serde(default)]
    entity_updates: BTreeMap<String, EntityPatch>,
}

/// What one character produced this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterLine {
    pub dialogue: String,
    pub reasoning: AgenticReasoning,
    /// Registry changes the character asked for, keyed by item.
    pub entity_updates: BTreeMap<String, EntityPatch>,
}

impl CharacterLine {
    /// Interpret a completion. Anything that is not the expected JSON is
    /// taken as plain dialogue.
    pub fn from_completion(raw: &str) -> Self {
        match parse_structured::<CharacterReply>(raw) {
            Structured::Parsed(reply) => {
                let dialogue = match reply.dialogue.trim() {
                    "" => raw.trim().to_string(),
                    line => line.to_string(),
                };
                let action_decision = match reply.action_decision.trim() {
                    "" => NO_ACTION.to_string(),
                    decision => decision.to_string(),
                };
                Self {
                    dialogue,
                    reasoning: AgenticReasoning {
                        thought: reply.thought.trim().to_string(),
                        action_decision,
                    },
                    entity_updates: reply.entity_updates,
                }
            }
            Structured::Raw(text) => Self::plain(text),
        }
    }

    /// Interpret a generator result, falling back to silence on error.
    pub fn from_result(result: Result<String, GenerationError>, speaker: &str) -> Self {
        match result {
            Ok(raw) => Self::from_completion(&raw),
            Err(e) => {
                tracing::warn!(speaker, error = %e, "Character generation failed, staying silent");
                Self::plain(SILENT_LINE.to_string())
            }
        }
    }

    fn plain(dialogue: String) -> Self {
        Self {
            dialogue,
            reasoning: AgenticReasoning {
                thought: String::new(),
                action_decision: NO_ACTION.to_string(),
            },
            entity_updates: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_reply() {
        let raw = r#"{"thought": "He is lying.", "action_decision": "points at the car",
                      "dialogue": "Your car hit me, sahib!",
                      "entity_updates": {"wallet": {"status": "found"}}}"#;
        let line = CharacterLine::from_completion(raw);

        assert_eq!(line.dialogue, "Your car hit me, sahib!");
        assert_eq!(line.reasoning.thought, "He is lying.");
        assert_eq!(line.reasoning.action_decision, "points at the car");
        assert_eq!(line.entity_updates["wallet"].status.as_deref(), Some("found"));
    }

    #[test]
    fn test_prose_becomes_dialogue() {
        let line = CharacterLine::from_completion("  Arre bhai, listen to me!  ");
        assert_eq!(line.dialogue, "Arre bhai, listen to me!");
        assert_eq!(line.reasoning.thought, "");
        assert_eq!(line.reasoning.action_decision, NO_ACTION);
    }

    #[test]
    fn test_empty_dialogue_falls_back_to_raw() {
        let raw = r#"{"thought": "hm", "dialogue": ""}"#;
        let line = CharacterLine::from_completion(raw);
        assert_eq!(line.dialogue, raw);
        assert_eq!(line.reasoning.action_decision, NO_ACTION);
    }

    #[test]
    fn test_generation_error_is_silence() {
        let line = CharacterLine::from_result(Err(GenerationError::Empty), "Saleem");
        assert_eq!(line.dialogue, SILENT_LINE);
    }
}
