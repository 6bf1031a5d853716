//! The story artifact written at the end of a run.
//!
//! The artifact holds no timestamps or ids, so two runs with the same seed
//! and the same generator replies serialize to identical bytes.

use crate::scenario::SeedStory;
use crate::story::{NarrativeEvent, StoryState};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Summary counts for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub title: String,
    pub dialogue_turn_count: u32,
    pub action_count: u32,
    /// Length of the event log.
    pub total_event_count: usize,
    /// Turn limit drawn when the story was created.
    pub target_turns: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactConclusion {
    pub reason: String,
    pub final_narration: String,
}

/// A finished (or interrupted) story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryArtifact {
    pub metadata: ArtifactMetadata,
    pub seed_input: SeedStory,
    pub events: Vec<NarrativeEvent>,
    pub conclusion: ArtifactConclusion,
}

impl StoryArtifact {
    pub fn from_state(state: &StoryState) -> Self {
        let conclusion = state
            .conclusion
            .as_ref()
            .map(|c| ArtifactConclusion {
                reason: c.reason.clone(),
                final_narration: c.final_narration.clone(),
            })
            .unwrap_or_default();

        Self {
            metadata: ArtifactMetadata {
                title: state.seed.title.clone(),
                dialogue_turn_count: state.dialogue_turn_count(),
                action_count: state.action_count,
                total_event_count: state.events.len(),
                target_turns: state.max_turns,
            },
            seed_input: state.seed.clone(),
            events: state.events.clone(),
            conclusion,
        }
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save as pretty-printed JSON.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        fs::write(path, self.to_json()?).await?;
        Ok(())
    }

    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let json = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::Conclusion;
    use crate::testing::TestHarness;

    #[test]
    fn test_metadata_counts() {
        let mut state = TestHarness::new().state();
        state.events.push(NarrativeEvent::DirectorNote {
            turn: 1,
            content: "Horns blare.".to_string(),
        });
        state.action_count = 2;
        state.conclusion = Some(Conclusion {
            reason: "Story concluded at turn 20".to_string(),
            final_narration: "The end.".to_string(),
        });

        let artifact = StoryArtifact::from_state(&state);
        assert_eq!(artifact.metadata.title, "The Rickshaw Accident");
        assert_eq!(artifact.metadata.total_event_count, 1);
        assert_eq!(artifact.metadata.action_count, 2);
        assert_eq!(artifact.metadata.target_turns, state.max_turns);
        assert_eq!(artifact.conclusion.final_narration, "The end.");
    }

    #[test]
    fn test_json_shape() {
        let artifact = StoryArtifact::from_state(&TestHarness::new().state());
        let json: serde_json::Value = serde_json::from_str(&artifact.to_json().unwrap()).unwrap();

        for key in ["metadata", "seed_input", "events", "conclusion"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["conclusion"]["reason"], "");
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story_output.json");
        let artifact = StoryArtifact::from_state(&TestHarness::new().state());

        artifact.save_json(&path).await.unwrap();
        let loaded = StoryArtifact::load_json(&path).await.unwrap();
        assert_eq!(loaded, artifact);
    }
}
