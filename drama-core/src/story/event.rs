//! The append-only narrative event log.

use crate::mystery::ClueType;
use serde::{Deserialize, Serialize};

/// Inner reasoning a character returned alongside its line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgenticReasoning {
    pub thought: String,
    pub action_decision: String,
}

/// One entry in the story's event stream.
///
/// Within a turn the orchestrator appends events in a fixed order:
/// intervention, turning point, clue, director note, then the dialogue or
/// action, then the conclusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NarrativeEvent {
    HardIntervention {
        turn: u32,
        event_id: String,
        content: String,
        effect: String,
    },
    TurningPoint {
        turn: u32,
        event_id: String,
        content: String,
        effect: String,
    },
    MysteryClue {
        turn: u32,
        clue_type: ClueType,
        content: String,
    },
    DirectorNote {
        turn: u32,
        content: String,
    },
    Dialogue {
        turn: u32,
        speaker: String,
        content: String,
        speaker_goal: String,
        agentic_reasoning: AgenticReasoning,
    },
    Action {
        turn: u32,
        action_number: u32,
        character: String,
        action: String,
        targets: Vec<String>,
        effect: String,
        narrative_phase: String,
    },
    Conclusion {
        turn: u32,
        content: String,
    },
}

impl NarrativeEvent {
    /// Turn this event belongs to.
    pub fn turn(&self) -> u32 {
        match self {
            NarrativeEvent::HardIntervention { turn, .. }
            | NarrativeEvent::TurningPoint { turn, .. }
            | NarrativeEvent::MysteryClue { turn, .. }
            | NarrativeEvent::DirectorNote { turn, .. }
            | NarrativeEvent::Dialogue { turn, .. }
            | NarrativeEvent::Action { turn, .. }
            | NarrativeEvent::Conclusion { turn, .. } => *turn,
        }
    }

    /// The serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            NarrativeEvent::HardIntervention { .. } => "hard_intervention",
            NarrativeEvent::TurningPoint { .. } => "turning_point",
            NarrativeEvent::MysteryClue { .. } => "mystery_clue",
            NarrativeEvent::DirectorNote { .. } => "director_note",
            NarrativeEvent::Dialogue { .. } => "dialogue",
            NarrativeEvent::Action { .. } => "action",
            NarrativeEvent::Conclusion { .. } => "conclusion",
        }
    }

    /// Position of this kind in the within-turn ordering.
    pub fn order_rank(&self) -> u8 {
        match self {
            NarrativeEvent::HardIntervention { .. } => 0,
            NarrativeEvent::TurningPoint { .. } => 1,
            NarrativeEvent::MysteryClue { .. } => 2,
            NarrativeEvent::DirectorNote { .. } => 3,
            NarrativeEvent::Dialogue { .. } | NarrativeEvent::Action { .. } => 4,
            NarrativeEvent::Conclusion { .. } => 5,
        }
    }
}
